/// Error types for discovery-service
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Validation error for an entity id that is not present in the store.
    pub fn not_found(field: &'static str, entity: &str, id: Uuid) -> Self {
        ServiceError::Validation {
            field,
            message: format!("{entity} with id {id} does not exist"),
        }
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
