//! Conversion from Clockify API types to canonical records.

use crate::model::{EntityGroup, EntityRecord};

use super::types::{CwClient, CwProject, CwTag, CwTask, CwTimeEntry, CwUser, CwUserGroup, CwWorkspace};

/// Convert a Clockify workspace to a canonical record.
pub fn to_workspace_record(workspace: &CwWorkspace) -> EntityRecord {
    EntityRecord::new(
        EntityGroup::Workspaces,
        &workspace.id,
        &workspace.name,
        &workspace.id,
    )
}

/// Convert a Clockify client to a canonical record.
pub fn to_client_record(client: &CwClient) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::Clients,
        &client.id,
        &client.name,
        &client.workspace_id,
    );
    record.is_active = !client.archived;
    record
}

/// Convert a Clockify project to a canonical record.
pub fn to_project_record(project: &CwProject) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::Projects,
        &project.id,
        &project.name,
        &project.workspace_id,
    );
    // "No client" arrives as an empty string.
    record.client_id = project
        .client_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(String::from);
    record.is_active = !project.archived;
    record.is_billable = project.billable;
    record
}

/// Convert a Clockify tag to a canonical record.
pub fn to_tag_record(tag: &CwTag) -> EntityRecord {
    EntityRecord::new(EntityGroup::Tags, &tag.id, &tag.name, &tag.workspace_id)
}

/// Convert a Clockify task to a canonical record.
pub fn to_task_record(task: &CwTask, workspace_id: &str) -> EntityRecord {
    let mut record = EntityRecord::new(EntityGroup::Tasks, &task.id, &task.name, workspace_id);
    record.project_id = Some(task.project_id.clone());
    record.is_active = task.status.as_deref() != Some("DONE");
    record
}

/// Convert a Clockify member to a canonical record.
pub fn to_user_record(user: &CwUser, workspace_id: &str) -> EntityRecord {
    let mut record = EntityRecord::new(EntityGroup::Users, &user.id, &user.name, workspace_id);
    record.email = Some(user.email.clone());
    record.is_active = !matches!(user.status.as_deref(), Some("INACTIVE") | Some("DECLINED"));
    record
}

/// Convert a Clockify user group to a canonical record.
pub fn to_user_group_record(group: &CwUserGroup, workspace_id: &str) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::UserGroups,
        &group.id,
        &group.name,
        workspace_id,
    );
    record.user_ids = group.user_ids.clone();
    record
}

/// Convert a Clockify time entry to a canonical record.
pub fn to_time_entry_record(entry: &CwTimeEntry, workspace_id: &str) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::TimeEntries,
        &entry.id,
        &entry.description,
        workspace_id,
    );
    record.start = Some(entry.time_interval.start);
    record.end = entry.time_interval.end;
    record.project_id = entry.project_id.clone().filter(|id| !id.is_empty());
    record.task_id = entry.task_id.clone().filter(|id| !id.is_empty());
    record.user_id = entry.user_id.clone();
    record.tag_ids = entry.tag_ids.clone();
    record.is_billable = entry.billable;
    record
}
