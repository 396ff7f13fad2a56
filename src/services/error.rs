use std::collections::HashMap;
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::validation::ValidationErrors;

/// Outcome kinds shared by every service operation. The HTTP layer maps each
/// kind to one status code in `error::ApiError`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Server(String),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        ServiceError::Authentication(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        ServiceError::Authorization(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict(message.into())
    }

    pub fn server(message: impl Into<String>) -> Self {
        ServiceError::Server(message.into())
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation {
            message: errors.summary(),
            field_errors: Some(errors.into_fields()),
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ServiceError::NotFound(format!("Not found: {}", msg)),
            DatabaseError::Duplicate(constraint) => {
                tracing::warn!("Unique constraint rejected write: {}", constraint);
                ServiceError::conflict("A record with the same unique value already exists")
            }
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ServiceError::Unavailable("Database temporarily unavailable".to_string())
            }
            other => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", other);
                ServiceError::server("An error occurred while processing your request")
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
