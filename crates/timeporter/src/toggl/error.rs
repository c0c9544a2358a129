//! Toggl API error types.

use thiserror::Error;

use crate::service::ServiceError;

/// Errors that can occur when interacting with the Toggl API.
#[derive(Debug, Error)]
pub enum TogglError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Toggl API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Rate limit still exceeded after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },

    #[error("invalid Toggl id: {0:?}")]
    InvalidId(String),

    #[error("record is missing {0}, cannot create")]
    MissingField(&'static str),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Check if an error indicates a rate limit rejection (retryable).
pub fn is_rate_limit_error(e: &TogglError) -> bool {
    matches!(e, TogglError::RateLimited)
}

impl From<TogglError> for ServiceError {
    fn from(e: TogglError) -> Self {
        match e {
            TogglError::Api { status: 401, .. } | TogglError::Api { status: 403, .. } => {
                ServiceError::AuthRequired
            }
            TogglError::Api { status: 404, message } => ServiceError::NotFound { resource: message },
            TogglError::Api { status, message } => ServiceError::Api { status, message },
            TogglError::RateLimited => ServiceError::RateLimited,
            TogglError::RateLimitExhausted { attempts } => {
                ServiceError::RateLimitExhausted { attempts }
            }
            TogglError::Http(message) => ServiceError::Network { message },
            TogglError::Json(e) => ServiceError::internal(format!("toggl payload: {e}")),
            TogglError::InvalidId(id) => ServiceError::internal(format!("invalid toggl id {id:?}")),
            TogglError::MissingField(field) => {
                ServiceError::internal(format!("record is missing {field}"))
            }
            TogglError::Cancelled => ServiceError::Cancelled,
        }
    }
}
