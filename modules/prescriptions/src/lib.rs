#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Prescription records for medrx.
//!
//! Layers follow the usual module split: `domain` holds the model, service
//! and repository contracts, `infra` the sea-orm storage and the outbound
//! drug-interaction client, `api::rest` the axum handlers and DTOs.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{AccessCatalogConfig, DatabaseConfig, InteractionsConfig, RoleConfig};
pub use domain::catalog::AccessCatalog;
pub use domain::error::{DomainError, InteractionError};
pub use domain::repo::{InteractionClient, PrescriptionRepository};
pub use infra::storage::sea_orm_repo::SeaOrmPrescriptionRepository;
pub use module::{ConcreteService, PrescriptionsModule};
