//! Progress reporting types for sync operations.
//!
//! This module provides a unified progress event system used across both
//! service clients, the transfer orchestrator and the coordinator to report
//! sync progress to whatever frontend is listening (CLI bars, logs).

use crate::model::EntityGroup;
use crate::service::ToolName;

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// Starting to fetch records of one group from one service.
    FetchingRecords {
        /// Service being fetched from.
        tool: ToolName,
        /// Entity group being fetched.
        group: EntityGroup,
        /// Workspace the fetch is scoped to (empty for the workspace list).
        workspace_id: String,
    },

    /// Fetched a page of records.
    FetchedPage {
        /// Service the page came from.
        tool: ToolName,
        /// Entity group being fetched.
        group: EntityGroup,
        /// Page number (1-indexed).
        page: u32,
        /// Number of records on this page.
        count: usize,
        /// Running total of records fetched so far.
        total_so_far: usize,
    },

    /// Finished fetching all records of one group from one service.
    FetchComplete {
        /// Service that finished fetching.
        tool: ToolName,
        /// Entity group that finished.
        group: EntityGroup,
        /// Workspace the fetch was scoped to.
        workspace_id: String,
        /// Total number of records fetched.
        total: usize,
    },

    /// Linked one group's source and target records.
    LinkComplete {
        /// Entity group that was linked.
        group: EntityGroup,
        /// Number of matched pairs.
        matched: usize,
        /// Number of source records left to transfer.
        to_transfer: usize,
    },

    /// The target-side workspace is ready (pre-existing or just created).
    WorkspaceEnsured {
        /// Workspace name.
        name: String,
        /// True if the workspace had to be created in the target.
        created: bool,
    },

    /// Starting to transfer one group's records into the target workspace.
    TransferringRecords {
        /// Entity group being transferred.
        group: EntityGroup,
        /// Source workspace the records belong to.
        workspace_id: String,
        /// Number of records to transfer.
        count: usize,
    },

    /// About to issue the create call for a single record.
    TransferringRecord {
        /// Entity group being transferred.
        group: EntityGroup,
        /// Source workspace the record belongs to.
        workspace_id: String,
        /// Name (or description) of the record.
        name: String,
        /// 1-indexed position within the batch.
        current: usize,
        /// Batch size.
        total: usize,
    },

    /// A single record failed to transfer (the batch continues).
    TransferFailed {
        /// Service the create call went to.
        tool: ToolName,
        /// Entity group being transferred.
        group: EntityGroup,
        /// Name (or description) of the record.
        name: String,
        /// Error message.
        error: String,
    },

    /// Transfer of one group finished.
    TransferComplete {
        /// Entity group that finished.
        group: EntityGroup,
        /// Number of records created.
        created: usize,
        /// Number of records that failed.
        errors: usize,
    },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        /// What was being attempted (e.g. "toggl clients page 2").
        label: String,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Current attempt number.
        attempt: u32,
    },

    /// Syncing multiple workspaces.
    SyncingWorkspaces {
        /// Number of workspaces to sync.
        count: usize,
    },

    /// The whole run finished.
    SyncComplete {
        /// Number of workspaces processed.
        workspaces: usize,
        /// Total records created across all groups.
        created: usize,
        /// Total per-record errors across all groups.
        errors: usize,
    },

    /// Warning message (non-fatal).
    Warning {
        /// Warning message.
        message: String,
    },
}

/// Progress callback for sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is present.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_with_no_callback_is_a_noop() {
        emit(
            None,
            SyncProgress::Warning {
                message: "nothing listens".to_string(),
            },
        );
    }

    #[test]
    fn test_emit_invokes_callback() {
        let events: Arc<Mutex<Vec<SyncProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let capture = Arc::clone(&events);
        let callback: ProgressCallback = Box::new(move |event| {
            capture
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event);
        });

        emit(Some(&callback), SyncProgress::SyncingWorkspaces { count: 2 });

        let events = events.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            SyncProgress::SyncingWorkspaces { count: 2 }
        ));
    }
}
