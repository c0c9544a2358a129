//! Top-level sync driver.
//!
//! Workspaces are processed one at a time, and within a workspace the entity
//! groups run strictly in [`TRANSFER_ORDER`]: projects reference clients,
//! tasks reference projects, and time entries reference almost everything
//! else, so each group must be fully linked before the next one is prepared.
//! After each group's transfer the fresh links are fed back into the link
//! tables, which is what lets later groups remap their parent references.

use std::collections::HashMap;

use crate::cancel::CancelToken;
use crate::link::{LinkTable, link_records, link_time_entries};
use crate::model::{EntityGroup, EntityRecord, TRANSFER_ORDER};
use crate::service::{ServiceError, TrackerClient, short_error_message};

use super::progress::{ProgressCallback, SyncProgress, emit};
use super::transfer::transfer_records;
use super::types::{
    GroupOutcome, SyncError, SyncOptions, SyncReport, TransferError, WorkspaceSyncReport,
};

/// Run a full sync: every selected workspace, every entity group.
///
/// Workspace selection: when `options.workspaces` is empty, every source
/// workspace that already exists on both sides is synced and none is ever
/// created. Workspaces named in the list are synced too, and created in the
/// target first if they have no counterpart there. Names in the list that
/// match no source workspace produce a warning.
///
/// The returned report contains one entry per processed workspace; a
/// workspace that failed outright (its target side could not be ensured)
/// carries an error and empty group outcomes. Only cancellation and a
/// failure to list workspaces abort the whole run.
#[tracing::instrument(skip_all, fields(workspaces = options.workspaces.len(), dry_run = options.dry_run))]
pub async fn sync_all<S, T>(
    source: &S,
    target: &T,
    options: &SyncOptions,
    cancel: &CancelToken,
    on_progress: Option<&ProgressCallback>,
) -> Result<SyncReport, SyncError>
where
    S: TrackerClient + ?Sized,
    T: TrackerClient + ?Sized,
{
    if cancel.is_cancelled() {
        return Err(SyncError::Cancelled);
    }

    let mut source_workspaces = source.fetch_workspaces(on_progress).await?;
    let mut target_workspaces = target.fetch_workspaces(on_progress).await?;

    link_records(
        EntityGroup::Workspaces,
        &mut source_workspaces,
        &mut target_workspaces,
        &LinkTable::new(),
    );

    // Explicitly requested workspaces are opted in for creation.
    for workspace in source_workspaces.iter_mut() {
        if !workspace.is_linked() && options.is_opted_in(&workspace.name) {
            workspace.is_included = true;
        }
    }

    for name in &options.workspaces {
        if !source_workspaces.iter().any(|w| &w.name == name) {
            emit(
                on_progress,
                SyncProgress::Warning {
                    message: format!("workspace {name:?} not found in {}", source.tool()),
                },
            );
        }
    }

    let selected: Vec<EntityRecord> = source_workspaces
        .iter()
        .filter(|w| {
            if options.workspaces.is_empty() {
                w.is_linked()
            } else {
                options.is_opted_in(&w.name)
            }
        })
        .cloned()
        .collect();

    emit(
        on_progress,
        SyncProgress::SyncingWorkspaces {
            count: selected.len(),
        },
    );

    let mut report = SyncReport::default();
    for workspace in selected {
        let workspace_report =
            sync_workspace(source, target, &workspace, options, cancel, on_progress).await?;
        report.workspaces.push(workspace_report);
    }

    emit(
        on_progress,
        SyncProgress::SyncComplete {
            workspaces: report.workspaces.len(),
            created: report.total_created(),
            errors: report.total_errors(),
        },
    );

    Ok(report)
}

/// Sync one workspace's entity groups into the target.
///
/// Returns `Err` only on cancellation. Every other failure is scoped: a
/// workspace whose target side cannot be ensured gets an error in its
/// report, a group whose fetch fails is treated as empty, and per-record
/// create failures accumulate in the group outcome.
#[tracing::instrument(skip_all, fields(workspace = %workspace.name))]
pub async fn sync_workspace<S, T>(
    source: &S,
    target: &T,
    workspace: &EntityRecord,
    options: &SyncOptions,
    cancel: &CancelToken,
    on_progress: Option<&ProgressCallback>,
) -> Result<WorkspaceSyncReport, SyncError>
where
    S: TrackerClient + ?Sized,
    T: TrackerClient + ?Sized,
{
    let mut report = WorkspaceSyncReport::new(&workspace.name, &workspace.id);

    // Ensure the target-side workspace before touching any child group.
    let target_workspace_id: Option<String> = match &workspace.linked_id {
        Some(linked) => {
            emit(
                on_progress,
                SyncProgress::WorkspaceEnsured {
                    name: workspace.name.clone(),
                    created: false,
                },
            );
            Some(linked.clone())
        }
        None if options.dry_run => {
            // Nothing exists on the target side yet; fetch/link still runs
            // against an empty target so the report shows what a real run
            // would create.
            report.workspace_created = true;
            None
        }
        None => match target.create_workspace(workspace).await {
            Ok(created) => {
                report.workspace_created = true;
                emit(
                    on_progress,
                    SyncProgress::WorkspaceEnsured {
                        name: workspace.name.clone(),
                        created: true,
                    },
                );
                Some(created.id)
            }
            Err(e) if e.is_cancelled() => return Err(SyncError::Cancelled),
            Err(e) => {
                let err = SyncError::WorkspaceEnsure {
                    workspace: workspace.name.clone(),
                    source: e,
                };
                tracing::warn!("{err}");
                report.error = Some(err.to_string());
                return Ok(report);
            }
        },
    };

    let mut workspace_links = LinkTable::new();
    if let Some(wid) = &target_workspace_id {
        workspace_links.insert(workspace.id.clone(), wid.clone());
    }

    // Per-group source-id → target-id tables, filled as groups complete.
    let mut link_tables: HashMap<EntityGroup, LinkTable> = HashMap::new();

    for group in TRANSFER_ORDER {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let mut outcome = GroupOutcome::default();

        let mut source_records = fetch_or_empty(source, group, &workspace.id, on_progress).await?;
        let mut target_records = match &target_workspace_id {
            Some(wid) => fetch_or_empty(target, group, wid, on_progress).await?,
            None => Vec::new(),
        };
        outcome.fetched_source = source_records.len();
        outcome.fetched_target = target_records.len();

        outcome.matched = run_linker(
            group,
            &mut source_records,
            &mut target_records,
            &workspace_links,
            &link_tables,
        );

        let to_create: Vec<&EntityRecord> = source_records
            .iter()
            .filter(|r| r.is_included && !r.is_linked())
            .collect();
        outcome.pending = to_create.len();

        emit(
            on_progress,
            SyncProgress::LinkComplete {
                group,
                matched: outcome.matched,
                to_transfer: outcome.pending,
            },
        );

        if !options.dry_run {
            if let Some(wid) = &target_workspace_id {
                let mut prepared = Vec::with_capacity(to_create.len());
                for record in &to_create {
                    match remap_for_target(record, wid, &link_tables) {
                        Ok(p) => prepared.push(p),
                        Err(message) => outcome.errors.push(TransferError {
                            name: record.name.clone(),
                            message,
                        }),
                    }
                }

                let wid_owned = wid.clone();
                let create_fn = move |record: EntityRecord| {
                    let wid = wid_owned.clone();
                    async move {
                        let source_id = record.linked_id.clone();
                        let mut created = target.create(&wid, &record).await?;
                        created.linked_id = source_id;
                        created.is_included = false;
                        Ok(created)
                    }
                };

                let transfer = transfer_records(
                    prepared,
                    create_fn,
                    None,
                    target.tool(),
                    cancel,
                    on_progress,
                )
                .await?;

                // Establish the new links on the source side, then feed the
                // created records back through the linker so the state after
                // this group is indistinguishable from "they always existed".
                for created in &transfer.created {
                    if let Some(source_id) = &created.linked_id {
                        if let Some(src) = source_records.iter_mut().find(|r| &r.id == source_id) {
                            src.linked_id = Some(created.id.clone());
                            src.is_included = false;
                        }
                    }
                }
                target_records.extend(transfer.created.iter().cloned());
                run_linker(
                    group,
                    &mut source_records,
                    &mut target_records,
                    &workspace_links,
                    &link_tables,
                );

                outcome.created = transfer.created.len();
                outcome.errors.extend(transfer.errors);
            }
        }

        link_tables.insert(group, LinkTable::from_records(&source_records));
        report.groups.push((group, outcome));
    }

    Ok(report)
}

/// Fetch one group, treating a failed fetch as "no data for this group".
///
/// Cancellation is the only error that propagates; anything else is reported
/// as a warning and the sync moves on with an empty record set.
async fn fetch_or_empty<C>(
    client: &C,
    group: EntityGroup,
    workspace_id: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<Vec<EntityRecord>, SyncError>
where
    C: TrackerClient + ?Sized,
{
    match client.fetch(group, workspace_id, on_progress).await {
        Ok(records) => Ok(records),
        Err(ServiceError::Cancelled) => Err(SyncError::Cancelled),
        Err(e) => {
            let message = format!(
                "failed to fetch {} from {}: {}",
                group,
                client.tool(),
                short_error_message(&e)
            );
            tracing::warn!("{message}");
            emit(on_progress, SyncProgress::Warning { message });
            Ok(Vec::new())
        }
    }
}

/// Dispatch to the right matcher for the group.
fn run_linker(
    group: EntityGroup,
    source: &mut [EntityRecord],
    target: &mut [EntityRecord],
    workspace_links: &LinkTable,
    link_tables: &HashMap<EntityGroup, LinkTable>,
) -> usize {
    if group == EntityGroup::TimeEntries {
        let empty = LinkTable::new();
        let project_links = link_tables.get(&EntityGroup::Projects).unwrap_or(&empty);
        link_time_entries(source, target, project_links)
    } else {
        link_records(group, source, target, workspace_links)
    }
}

/// Rewrite a source record's references so the target service can accept it.
///
/// The record keeps its source id in `linked_id` (that is how the created
/// record is paired back to it); every parent reference is translated
/// through the link tables of the groups that ran earlier. A reference that
/// cannot be translated means the parent was neither matched nor created;
/// creating the child anyway would produce a dangling reference in the
/// target, so the record is rejected instead. The owning user is the one
/// exception: entries whose user has no counterpart fall back to the
/// authenticated user on the target side.
fn remap_for_target(
    record: &EntityRecord,
    target_workspace_id: &str,
    link_tables: &HashMap<EntityGroup, LinkTable>,
) -> Result<EntityRecord, String> {
    let resolve = |group: EntityGroup, id: &str| -> Result<String, String> {
        link_tables
            .get(&group)
            .and_then(|t| t.target_of(id))
            .map(String::from)
            .ok_or_else(|| format!("references {} {} with no counterpart in the target", group, id))
    };

    let mut prepared = record.clone();
    prepared.workspace_id = target_workspace_id.to_string();
    prepared.linked_id = Some(record.id.clone());

    if let Some(client_id) = &record.client_id {
        prepared.client_id = Some(resolve(EntityGroup::Clients, client_id)?);
    }
    if let Some(project_id) = &record.project_id {
        prepared.project_id = Some(resolve(EntityGroup::Projects, project_id)?);
    }
    if let Some(task_id) = &record.task_id {
        prepared.task_id = Some(resolve(EntityGroup::Tasks, task_id)?);
    }
    prepared.tag_ids = record
        .tag_ids
        .iter()
        .map(|tag_id| resolve(EntityGroup::Tags, tag_id))
        .collect::<Result<Vec<_>, _>>()?;
    prepared.user_id = record.user_id.as_ref().and_then(|user_id| {
        link_tables
            .get(&EntityGroup::Users)
            .and_then(|t| t.target_of(user_id))
            .map(String::from)
    });

    Ok(prepared)
}
