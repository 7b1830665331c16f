use std::sync::Arc;

use serde_json::Value;

use super::error::DomainError;
use super::model::{
    DailyCount, DateRange, NewPrescription, Page, PageRequest, Prescription, PrescriptionEdit,
};
use super::repo::{InteractionClient, PrescriptionRepository};

pub struct Service<R: PrescriptionRepository> {
    repo: Arc<R>,
    interactions: Arc<dyn InteractionClient>,
}

impl<R: PrescriptionRepository> Service<R> {
    #[must_use]
    pub fn new(repo: Arc<R>, interactions: Arc<dyn InteractionClient>) -> Self {
        Self { repo, interactions }
    }

    /// # Errors
    /// Validation failures, or a storage error.
    pub async fn create(&self, new: NewPrescription) -> Result<Prescription, DomainError> {
        new.validate()?;
        let created = self.repo.insert(new).await?;
        tracing::info!(prescription.id = created.id, "Prescription created");
        Ok(created)
    }

    /// # Errors
    /// [`DomainError::NotFound`] for an unknown id.
    pub async fn get(&self, id: i64) -> Result<Prescription, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { id })
    }

    /// Replaces every editable field; the prescription date is kept.
    ///
    /// # Errors
    /// [`DomainError::NotFound`] for an unknown id, validation failures, or a storage error.
    pub async fn update(
        &self,
        id: i64,
        edit: PrescriptionEdit,
    ) -> Result<Prescription, DomainError> {
        let existing = self.get(id).await?;
        edit.validate(existing.prescription_date)?;

        let updated = self
            .repo
            .update(id, edit)
            .await?
            .ok_or(DomainError::NotFound { id })?;
        tracing::info!(prescription.id = id, "Prescription updated");
        Ok(updated)
    }

    /// # Errors
    /// [`DomainError::NotFound`] for an unknown id.
    pub async fn delete(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::NotFound { id });
        }
        tracing::info!(prescription.id = id, "Prescription deleted");
        Ok(())
    }

    /// # Errors
    /// Storage errors only.
    pub async fn list(
        &self,
        page: PageRequest,
        range: Option<DateRange>,
    ) -> Result<Page<Prescription>, DomainError> {
        self.repo.list(page, range).await
    }

    /// # Errors
    /// Storage errors only.
    pub async fn daily_report(&self) -> Result<Vec<DailyCount>, DomainError> {
        self.repo.daily_counts().await
    }

    /// Raw upstream JSON, passed through untouched.
    ///
    /// # Errors
    /// [`DomainError::Upstream`] when the interaction service fails.
    pub async fn drug_interactions(&self) -> Result<Value, DomainError> {
        Ok(self.interactions.fetch().await?)
    }
}
