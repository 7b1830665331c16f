use std::sync::Arc;

use anyhow::Context;
use axum::Router;

use crate::api::rest::routes;
use crate::config::{AccessCatalogConfig, DatabaseConfig, InteractionsConfig};
use crate::domain::catalog::AccessCatalog;
use crate::domain::repo::InteractionClient;
use crate::domain::service::Service;
use crate::infra::interactions::HttpInteractionClient;
use crate::infra::storage::{self, sea_orm_repo::SeaOrmPrescriptionRepository};

pub type ConcreteService = Service<SeaOrmPrescriptionRepository>;

/// Prescriptions module: owns the service and builds its REST router.
#[derive(Clone)]
pub struct PrescriptionsModule {
    service: Arc<ConcreteService>,
    catalog: Arc<AccessCatalog>,
}

impl PrescriptionsModule {
    /// Connect storage, run migrations and wire the HTTP interaction client.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated, or the
    /// interaction client cannot be built.
    pub async fn init(
        database: &DatabaseConfig,
        interactions: &InteractionsConfig,
        catalog: &AccessCatalogConfig,
    ) -> anyhow::Result<Self> {
        let db = storage::connect(database)
            .await
            .with_context(|| format!("failed to open prescription database '{}'", database.url))?;
        let client = HttpInteractionClient::from_config(interactions)
            .context("failed to build drug interaction client")?;

        tracing::info!(
            interactions_url = %interactions.url,
            roles = catalog.roles.len(),
            "prescriptions module initialized"
        );
        Ok(Self::from_parts(
            SeaOrmPrescriptionRepository::new(db),
            Arc::new(client),
            AccessCatalog::from_config(catalog),
        ))
    }

    #[must_use]
    pub fn from_parts(
        repo: SeaOrmPrescriptionRepository,
        interactions: Arc<dyn InteractionClient>,
        catalog: AccessCatalog,
    ) -> Self {
        Self {
            service: Arc::new(Service::new(Arc::new(repo), interactions)),
            catalog: Arc::new(catalog),
        }
    }

    #[must_use]
    pub fn service(&self) -> Arc<ConcreteService> {
        Arc::clone(&self.service)
    }

    #[must_use]
    pub fn router(&self) -> Router {
        routes::router(Arc::clone(&self.service), Arc::clone(&self.catalog))
    }
}
