use async_trait::async_trait;
use serde_json::Value;

use super::error::{DomainError, InteractionError};
use super::model::{
    DailyCount, DateRange, NewPrescription, Page, PageRequest, Prescription, PrescriptionEdit,
};

#[async_trait]
pub trait PrescriptionRepository: Send + Sync {
    async fn insert(&self, new: NewPrescription) -> Result<Prescription, DomainError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Prescription>, DomainError>;

    /// Returns `None` when no row has this id.
    async fn update(
        &self,
        id: i64,
        edit: PrescriptionEdit,
    ) -> Result<Option<Prescription>, DomainError>;

    /// Returns `false` when no row has this id.
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;

    async fn list(
        &self,
        page: PageRequest,
        range: Option<DateRange>,
    ) -> Result<Page<Prescription>, DomainError>;

    /// Prescription counts grouped by date, oldest first.
    async fn daily_counts(&self) -> Result<Vec<DailyCount>, DomainError>;
}

/// Source of drug-interaction data.
#[async_trait]
pub trait InteractionClient: Send + Sync {
    async fn fetch(&self) -> Result<Value, InteractionError>;
}
