//! Service-agnostic seam between the engine and the two tracker APIs.
//!
//! This module defines the [`TrackerClient`] trait that provides a unified
//! interface for fetching and creating records on either time-tracking
//! service, plus the shared error type and the per-run rate limiter.
//!
//! # Example
//!
//! ```ignore
//! use timeporter::service::{TrackerClient, ServiceError};
//! use timeporter::model::EntityGroup;
//!
//! async fn list_clients<C: TrackerClient>(client: &C, wid: &str) -> Result<(), ServiceError> {
//!     let records = client.fetch(EntityGroup::Clients, wid, None).await?;
//!     for record in records {
//!         println!("{}", record.name);
//!     }
//!     Ok(())
//! }
//! ```

mod errors;
mod rate_limit;
mod types;

pub use errors::{Result, ServiceError, short_error_message};
pub use rate_limit::{ApiRateLimiter, default_rps_for_tool, rate_limits};
pub use types::{ToolName, TrackerClient};
