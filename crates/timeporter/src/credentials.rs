//! Credentials consumed by a sync run.
//!
//! The engine never stores these; the frontend resolves them (config file,
//! environment, prompt) and hands them over once per run.

use crate::sync::SyncError;

/// API credentials for both services.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Toggl API token (Profile → API Token).
    pub toggl_api_token: String,
    /// Email of the Toggl account, sent as the reports `user_agent`.
    pub toggl_email: String,
    /// Clockify API key (Profile → API → Generate).
    pub clockify_api_key: String,
    /// Clockify id of the authenticated user; time entries are listed
    /// per-user, so fetching them needs it.
    pub clockify_user_id: String,
}

impl Credentials {
    /// Fail fast on credentials a run cannot work with.
    ///
    /// This only checks presence; a token that is present but wrong
    /// surfaces as an authentication error on the first request.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.toggl_api_token.trim().is_empty() {
            return Err(SyncError::Credentials(
                "toggl api token is missing".to_string(),
            ));
        }
        if self.clockify_api_key.trim().is_empty() {
            return Err(SyncError::Credentials(
                "clockify api key is missing".to_string(),
            ));
        }
        if self.clockify_user_id.trim().is_empty() {
            return Err(SyncError::Credentials(
                "clockify user id is missing".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Credentials {
        Credentials {
            toggl_api_token: "tok".to_string(),
            toggl_email: "jo@example.com".to_string(),
            clockify_api_key: "key".to_string(),
            clockify_user_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_complete_credentials_validate() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_missing_toggl_token_fails() {
        let mut creds = complete();
        creds.toggl_api_token = "  ".to_string();
        let err = creds.validate().expect_err("should fail");
        assert!(err.to_string().contains("toggl api token"));
    }

    #[test]
    fn test_missing_clockify_key_fails() {
        let mut creds = complete();
        creds.clockify_api_key = String::new();
        assert!(creds.validate().is_err());
    }

    #[test]
    fn test_missing_clockify_user_fails() {
        let mut creds = complete();
        creds.clockify_user_id = String::new();
        assert!(creds.validate().is_err());
    }

    #[test]
    fn test_email_is_not_required() {
        // The reports user_agent falls back to the crate name.
        let mut creds = complete();
        creds.toggl_email = String::new();
        assert!(creds.validate().is_ok());
    }
}
