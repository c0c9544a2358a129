//! Clockify API error types.

use thiserror::Error;

use crate::service::ServiceError;

/// Errors that can occur when interacting with the Clockify API.
#[derive(Debug, Error)]
pub enum ClockifyError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clockify API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Rate limit still exceeded after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },

    #[error("record is missing {0}, cannot create")]
    MissingField(&'static str),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Check if an error indicates a rate limit rejection (retryable).
pub fn is_rate_limit_error(e: &ClockifyError) -> bool {
    matches!(e, ClockifyError::RateLimited)
}

impl From<ClockifyError> for ServiceError {
    fn from(e: ClockifyError) -> Self {
        match e {
            ClockifyError::Api { status: 401, .. } | ClockifyError::Api { status: 403, .. } => {
                ServiceError::AuthRequired
            }
            ClockifyError::Api { status: 404, message } => {
                ServiceError::NotFound { resource: message }
            }
            ClockifyError::Api { status, message } => ServiceError::Api { status, message },
            ClockifyError::RateLimited => ServiceError::RateLimited,
            ClockifyError::RateLimitExhausted { attempts } => {
                ServiceError::RateLimitExhausted { attempts }
            }
            ClockifyError::Http(message) => ServiceError::Network { message },
            ClockifyError::Json(e) => ServiceError::internal(format!("clockify payload: {e}")),
            ClockifyError::MissingField(field) => {
                ServiceError::internal(format!("record is missing {field}"))
            }
            ClockifyError::Cancelled => ServiceError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_rate_limit_error() {
        assert!(is_rate_limit_error(&ClockifyError::RateLimited));
        assert!(!is_rate_limit_error(&ClockifyError::Api {
            status: 500,
            message: "boom".to_string()
        }));
    }

    #[test]
    fn test_auth_statuses_map_to_auth_required() {
        let err: ServiceError = ClockifyError::Api {
            status: 401,
            message: "bad key".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::AuthRequired));
    }

    #[test]
    fn test_not_found_maps_through() {
        let err: ServiceError = ClockifyError::Api {
            status: 404,
            message: "no such workspace".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }
}
