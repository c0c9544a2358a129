//! Shared sync types and constants.

use thiserror::Error;

use crate::model::EntityGroup;
use crate::service::ServiceError;

/// Fixed delay between rate-limit retry attempts, in milliseconds.
pub const RATE_LIMIT_BACKOFF_MS: u64 = 1_200;

/// Maximum attempts for a single rate-limited request, including the first.
pub const MAX_RATE_LIMIT_ATTEMPTS: u32 = 5;

/// Options for a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Names of source workspaces to sync.
    ///
    /// A workspace named here that has no counterpart in the target is
    /// created there (explicit opt-in). When the list is empty, only
    /// workspaces that already exist on both sides are synced and none are
    /// ever created.
    pub workspaces: Vec<String>,
    /// Dry run mode - fetch and link, but never create anything.
    pub dry_run: bool,
}

impl SyncOptions {
    /// Whether a source workspace with this name is opted in for creation.
    #[must_use]
    pub fn is_opted_in(&self, name: &str) -> bool {
        self.workspaces.iter().any(|w| w == name)
    }
}

/// A single record that failed to transfer.
#[derive(Debug, Clone)]
pub struct TransferError {
    /// Name (or description) of the record that failed.
    pub name: String,
    /// Error message.
    pub message: String,
}

/// Outcome of transferring one entity group within one workspace.
#[derive(Debug, Default)]
pub struct GroupOutcome {
    /// Records fetched from the source.
    pub fetched_source: usize,
    /// Records fetched from the target.
    pub fetched_target: usize,
    /// Pairs matched by the linker.
    pub matched: usize,
    /// Unmatched source records selected for transfer.
    pub pending: usize,
    /// Records created in the target.
    pub created: usize,
    /// Per-record failures (the batch always runs to the end).
    pub errors: Vec<TransferError>,
}

/// Result of syncing a single workspace.
#[derive(Debug)]
pub struct WorkspaceSyncReport {
    /// The source workspace name.
    pub workspace: String,
    /// The source workspace id.
    pub workspace_id: String,
    /// True if the workspace itself was created in the target.
    pub workspace_created: bool,
    /// Per-group outcomes, in transfer order.
    pub groups: Vec<(EntityGroup, GroupOutcome)>,
    /// Error if the workspace sync failed before any group ran.
    pub error: Option<String>,
}

impl WorkspaceSyncReport {
    #[must_use]
    pub fn new(workspace: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            workspace: workspace.into(),
            workspace_id: workspace_id.into(),
            workspace_created: false,
            groups: Vec::new(),
            error: None,
        }
    }

    /// Total records created across all groups.
    #[must_use]
    pub fn total_created(&self) -> usize {
        self.groups.iter().map(|(_, g)| g.created).sum()
    }

    /// Total per-record errors across all groups.
    #[must_use]
    pub fn total_errors(&self) -> usize {
        self.groups.iter().map(|(_, g)| g.errors.len()).sum()
    }
}

/// Result of a whole sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Per-workspace reports, in processing order.
    pub workspaces: Vec<WorkspaceSyncReport>,
}

impl SyncReport {
    /// Total records created across all workspaces.
    #[must_use]
    pub fn total_created(&self) -> usize {
        self.workspaces.iter().map(|w| w.total_created()).sum()
    }

    /// Total per-record errors across all workspaces.
    #[must_use]
    pub fn total_errors(&self) -> usize {
        self.workspaces.iter().map(|w| w.total_errors()).sum()
    }

    /// Whether any workspace failed outright.
    #[must_use]
    pub fn has_failed_workspaces(&self) -> bool {
        self.workspaces.iter().any(|w| w.error.is_some())
    }
}

/// Errors that abort a sync run (or a whole workspace within it).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Credentials were missing or rejected; nothing was synced.
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// The workspace itself could not be ensured in the target.
    #[error("Failed to ensure workspace {workspace}: {source}")]
    WorkspaceEnsure {
        workspace: String,
        #[source]
        source: ServiceError,
    },

    /// A service call failed in a way the coordinator cannot scope down.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The run was cancelled.
    #[error("Sync cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_options_default() {
        let options = SyncOptions::default();
        assert!(options.workspaces.is_empty());
        assert!(!options.dry_run);
    }

    #[test]
    fn test_sync_options_opt_in() {
        let options = SyncOptions {
            workspaces: vec!["Main".to_string()],
            dry_run: false,
        };
        assert!(options.is_opted_in("Main"));
        assert!(!options.is_opted_in("Other"));
    }

    #[test]
    fn test_workspace_report_totals() {
        let mut report = WorkspaceSyncReport::new("Main", "w1");
        report.groups.push((
            EntityGroup::Clients,
            GroupOutcome {
                fetched_source: 5,
                fetched_target: 2,
                matched: 2,
                pending: 3,
                created: 3,
                errors: vec![],
            },
        ));
        report.groups.push((
            EntityGroup::Projects,
            GroupOutcome {
                fetched_source: 4,
                fetched_target: 0,
                matched: 0,
                pending: 4,
                created: 3,
                errors: vec![TransferError {
                    name: "Apollo".to_string(),
                    message: "boom".to_string(),
                }],
            },
        ));

        assert_eq!(report.total_created(), 6);
        assert_eq!(report.total_errors(), 1);
    }

    #[test]
    fn test_sync_report_aggregates_workspaces() {
        let mut ws = WorkspaceSyncReport::new("Main", "w1");
        ws.groups.push((
            EntityGroup::Tags,
            GroupOutcome {
                created: 2,
                ..GroupOutcome::default()
            },
        ));

        let mut failed = WorkspaceSyncReport::new("Broken", "w2");
        failed.error = Some("workspace ensure failed".to_string());

        let report = SyncReport {
            workspaces: vec![ws, failed],
        };

        assert_eq!(report.total_created(), 2);
        assert_eq!(report.total_errors(), 0);
        assert!(report.has_failed_workspaces());
    }
}
