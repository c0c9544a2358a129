//! Shared sync infrastructure: the coordinator, the transfer orchestrator,
//! progress reporting and the report types.
//!
//! # Module Structure
//!
//! - [`types`](self) - Core types: `SyncOptions`, `SyncReport`, constants
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - coordinator - `sync_all()` / `sync_workspace()`
//! - transfer - `transfer_records()`
//!
//! # Example
//!
//! ```ignore
//! use timeporter::cancel::CancelToken;
//! use timeporter::sync::{SyncOptions, sync_all};
//!
//! let options = SyncOptions {
//!     workspaces: vec!["Main".to_string()],
//!     dry_run: false,
//! };
//! let cancel = CancelToken::new();
//! let report = sync_all(&toggl, &clockify, &options, &cancel, None).await?;
//! println!("created {} records", report.total_created());
//! ```

mod coordinator;
pub mod progress;
mod transfer;
mod types;

// Re-export types
pub use types::{
    GroupOutcome, SyncError, SyncOptions, SyncReport, TransferError, WorkspaceSyncReport,
};

// Re-export constants
pub use types::{MAX_RATE_LIMIT_ATTEMPTS, RATE_LIMIT_BACKOFF_MS};

// Re-export progress types
pub use progress::{ProgressCallback, SyncProgress, emit};

// Re-export engine functions for convenience
pub use coordinator::{sync_all, sync_workspace};
pub use transfer::{TransferOutcome, transfer_records};
