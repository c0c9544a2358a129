//! Configuration file support for timeporter.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `TIMEPORTER_`, e.g.,
//!    `TIMEPORTER_TOGGL_API_TOKEN`)
//! 2. Config file (~/.config/timeporter/config.toml or ./timeporter.toml)
//! 3. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [toggl]
//! api_token = "..."   # or TIMEPORTER_TOGGL_API_TOKEN
//! email = "jo@example.com"
//!
//! [clockify]
//! api_key = "..."     # or TIMEPORTER_CLOCKIFY_API_KEY
//! user_id = "..."     # or TIMEPORTER_CLOCKIFY_USER_ID
//!
//! [sync]
//! workspaces = ["Main"]
//! ```

use config::{Config as ConfigBuilder, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use timeporter::Credentials;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toggl configuration.
    pub toggl: TogglConfig,
    /// Clockify configuration.
    pub clockify: ClockifyConfig,
    /// Default sync options.
    pub sync: SyncConfig,
}

/// Toggl configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TogglConfig {
    /// Personal API token.
    pub api_token: Option<String>,
    /// Account email, used as the reports `user_agent`.
    pub email: Option<String>,
}

/// Clockify configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClockifyConfig {
    /// API key.
    pub api_key: Option<String>,
    /// Id of the authenticated user.
    pub user_id: Option<String>,
}

/// Default sync options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Workspace names to sync when the CLI flag is not given.
    pub workspaces: Vec<String>,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        // A .env in the working directory is a convenience, not a requirement.
        let _ = dotenvy::dotenv();

        let mut builder = ConfigBuilder::builder();

        if let Some(dirs) = ProjectDirs::from("", "", "timeporter") {
            let path = dirs.config_dir().join("config.toml");
            builder = builder.add_source(
                File::from(path).format(FileFormat::Toml).required(false),
            );
        }
        builder = builder.add_source(
            File::with_name("timeporter")
                .format(FileFormat::Toml)
                .required(false),
        );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables beat the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TIMEPORTER_TOGGL_API_TOKEN") {
            self.toggl.api_token = Some(v);
        }
        if let Ok(v) = std::env::var("TIMEPORTER_TOGGL_EMAIL") {
            self.toggl.email = Some(v);
        }
        if let Ok(v) = std::env::var("TIMEPORTER_CLOCKIFY_API_KEY") {
            self.clockify.api_key = Some(v);
        }
        if let Ok(v) = std::env::var("TIMEPORTER_CLOCKIFY_USER_ID") {
            self.clockify.user_id = Some(v);
        }
    }

    /// Assemble run credentials from whatever was configured.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            toggl_api_token: self.toggl.api_token.clone().unwrap_or_default(),
            toggl_email: self.toggl.email.clone().unwrap_or_default(),
            clockify_api_key: self.clockify.api_key.clone().unwrap_or_default(),
            clockify_user_id: self.clockify.user_id.clone().unwrap_or_default(),
        }
    }
}
