//! Timeporter - move time-tracking data from Toggl to Clockify.
//!
//! This library is the transfer engine: it fetches workspaces, clients,
//! projects, tags, tasks, users, user groups and time entries from both
//! services, figures out which records already exist on both sides
//! (linking), and creates the rest in the target in dependency order:
//! clients before the projects that reference them, projects before tasks,
//! everything before time entries. Per-service rate limits are respected
//! throughout, and one bad record never aborts a batch.
//!
//! # Example
//!
//! ```ignore
//! use timeporter::cancel::CancelToken;
//! use timeporter::service::{ApiRateLimiter, ToolName};
//! use timeporter::sync::{SyncOptions, sync_all};
//! use timeporter::{ClockifyClient, TogglClient};
//!
//! let cancel = CancelToken::new();
//! let toggl = TogglClient::new(
//!     &token,
//!     &email,
//!     Some(ApiRateLimiter::for_tool(ToolName::Toggl)),
//!     cancel.clone(),
//! )?;
//! let clockify = ClockifyClient::new(
//!     &api_key,
//!     &user_id,
//!     Some(ApiRateLimiter::for_tool(ToolName::Clockify)),
//!     cancel.clone(),
//! )?;
//!
//! let options = SyncOptions {
//!     workspaces: vec!["Main".to_string()],
//!     dry_run: false,
//! };
//! let report = sync_all(&toggl, &clockify, &options, &cancel, None).await?;
//! println!("created {} records", report.total_created());
//! ```

pub mod cancel;
pub mod clockify;
pub mod credentials;
pub mod http;
pub mod link;
pub mod model;
pub mod retry;
pub mod service;
pub mod sync;
pub mod toggl;

pub use cancel::CancelToken;
pub use clockify::ClockifyClient;
pub use credentials::Credentials;
pub use model::{EntityGroup, EntityRecord, Mapping, TRANSFER_ORDER};
pub use service::{ApiRateLimiter, ServiceError, ToolName, TrackerClient};
pub use sync::{SyncError, SyncOptions, SyncReport, sync_all};
pub use toggl::TogglClient;
