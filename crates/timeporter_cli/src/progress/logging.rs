//! Structured logging fallback for non-TTY runs (CI, pipes).

use timeporter::sync::SyncProgress;

/// Logs progress events through tracing instead of drawing bars.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::FetchComplete {
                tool, group, total, ..
            } => {
                tracing::info!("fetched {} {} from {}", total, group, tool);
            }
            SyncProgress::LinkComplete {
                group,
                matched,
                to_transfer,
            } => {
                tracing::info!(
                    "linked {}: {} matched, {} to create",
                    group,
                    matched,
                    to_transfer
                );
            }
            SyncProgress::WorkspaceEnsured { name, created } => {
                if created {
                    tracing::info!("created workspace {:?} in clockify", name);
                } else {
                    tracing::info!("workspace {:?} already present in clockify", name);
                }
            }
            SyncProgress::TransferringRecords { group, count, .. } => {
                tracing::info!("creating {} {}", count, group);
            }
            SyncProgress::TransferFailed { tool, name, error, .. } => {
                tracing::warn!("{}: failed to create {:?}: {}", tool, name, error);
            }
            SyncProgress::TransferComplete {
                group,
                created,
                errors,
            } => {
                tracing::info!("{}: {} created, {} failed", group, created, errors);
            }
            SyncProgress::RateLimitBackoff {
                label,
                retry_after_ms,
                attempt,
            } => {
                tracing::warn!(
                    "rate limited on {}; retrying in {}ms (attempt {})",
                    label,
                    retry_after_ms,
                    attempt
                );
            }
            SyncProgress::SyncComplete {
                workspaces,
                created,
                errors,
            } => {
                tracing::info!(
                    "sync complete: {} workspace(s), {} created, {} error(s)",
                    workspaces,
                    created,
                    errors
                );
            }
            SyncProgress::Warning { message } => {
                tracing::warn!("{}", message);
            }
            _ => {}
        }
    }
}
