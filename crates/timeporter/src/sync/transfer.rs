//! Rate-limited transfer of unmatched records into the target service.
//!
//! The orchestrator is deliberately dumb: it walks a prepared batch in input
//! order, paces each create call through the rate limiter, and keeps going
//! when individual records fail. Retrying 429s is the create function's
//! business (service clients share the fetch path's constant backoff), and
//! reference remapping has already happened by the time a batch reaches this
//! point.

use std::future::Future;

use crate::cancel::CancelToken;
use crate::model::EntityRecord;
use crate::service::{ApiRateLimiter, ServiceError, ToolName, short_error_message};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::types::{SyncError, TransferError};

/// Result of transferring one batch.
#[derive(Debug, Default)]
pub struct TransferOutcome {
    /// Successfully created target records. Each carries its source record's
    /// id in `linked_id`, so callers can establish links without assuming
    /// anything about completion order.
    pub created: Vec<EntityRecord>,
    /// Records that failed, in input order.
    pub errors: Vec<TransferError>,
}

/// Create every record in `records` in the target service.
///
/// For each record, in input order: check cancellation, emit a
/// [`SyncProgress::TransferringRecord`] event, wait for a rate-limiter slot
/// (when one is supplied), then call `create_fn`. A failed record is pushed
/// onto the error list and the batch continues; the only way this function
/// returns early is cancellation.
///
/// `create_fn` receives each record with `linked_id` set to the source
/// record's id and must return the created record with that same tag, which
/// keeps source→created pairing correct even if calls were ever reordered.
pub async fn transfer_records<F, Fut>(
    records: Vec<EntityRecord>,
    create_fn: F,
    limiter: Option<&ApiRateLimiter>,
    tool: ToolName,
    cancel: &CancelToken,
    on_progress: Option<&ProgressCallback>,
) -> Result<TransferOutcome, SyncError>
where
    F: Fn(EntityRecord) -> Fut,
    Fut: Future<Output = Result<EntityRecord, ServiceError>>,
{
    let mut outcome = TransferOutcome::default();
    let total = records.len();

    if total == 0 {
        return Ok(outcome);
    }

    let group = records[0].group;
    let workspace_id = records[0].workspace_id.clone();

    emit(
        on_progress,
        SyncProgress::TransferringRecords {
            group,
            workspace_id: workspace_id.clone(),
            count: total,
        },
    );

    for (index, record) in records.into_iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        emit(
            on_progress,
            SyncProgress::TransferringRecord {
                group: record.group,
                workspace_id: record.workspace_id.clone(),
                name: record.name.clone(),
                current: index + 1,
                total,
            },
        );

        if let Some(limiter) = limiter {
            limiter.wait().await;
        }

        let name = record.name.clone();
        match create_fn(record).await {
            Ok(created) => outcome.created.push(created),
            Err(e) if e.is_cancelled() => return Err(SyncError::Cancelled),
            Err(e) => {
                let message = short_error_message(&e);
                emit(
                    on_progress,
                    SyncProgress::TransferFailed {
                        tool,
                        group,
                        name: name.clone(),
                        error: message.clone(),
                    },
                );
                tracing::warn!("Failed to create {} {:?}: {}", group, name, message);
                outcome.errors.push(TransferError { name, message });
            }
        }
    }

    emit(
        on_progress,
        SyncProgress::TransferComplete {
            group,
            created: outcome.created.len(),
            errors: outcome.errors.len(),
        },
    );

    Ok(outcome)
}
