use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Prescription not found with id: {id}")]
    NotFound { id: i64 },

    #[error("Validation error on field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Drug interaction lookup failed: {0}")]
    Upstream(#[from] InteractionError),
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure talking to the external drug-interaction service.
#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("upstream answered with status {0}")]
    Status(u16),

    #[error("upstream body is not valid JSON: {0}")]
    Decode(String),
}
