use thiserror::Error;

/// Errors that can occur when talking to a time-tracking service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// API error from the service.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service rejected the request with HTTP 429.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Rate-limit retries were exhausted without a successful response.
    #[error("Rate limit still exceeded after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },

    /// Authentication required or failed.
    #[error("Authentication required")]
    AuthRequired,

    /// Resource not found (workspace, project, etc.).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Network or connection error.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The sync run was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// Unexpected/internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ServiceError {
    /// Create an API error.
    #[inline]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is a rate limit rejection (retryable).
    #[inline]
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Check if this error surfaced a cancellation request.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which is useful for errors
/// that include multi-line details. This provides a concise message for
/// progress reporting and logging.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_api() {
        let err = ServiceError::api(400, "bad request");
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("bad request"));
    }

    #[test]
    fn test_service_error_is_rate_limited() {
        assert!(ServiceError::RateLimited.is_rate_limited());
        assert!(!ServiceError::api(500, "boom").is_rate_limited());
        assert!(!ServiceError::RateLimitExhausted { attempts: 5 }.is_rate_limited());
    }

    #[test]
    fn test_service_error_is_cancelled() {
        assert!(ServiceError::Cancelled.is_cancelled());
        assert!(!ServiceError::AuthRequired.is_cancelled());
    }

    #[test]
    fn test_short_error_message_takes_first_line() {
        let err = std::io::Error::other("first line\nsecond line");
        assert_eq!(short_error_message(&err), "first line");
    }
}
