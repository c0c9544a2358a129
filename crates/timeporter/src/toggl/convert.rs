//! Conversion from Toggl API types to canonical records.
//!
//! Numeric Toggl ids become strings here and never turn back into numbers
//! outside the Toggl client itself.

use crate::model::{EntityGroup, EntityRecord};

use super::types::{
    TogglClientRecord, TogglGroup, TogglProject, TogglReportEntry, TogglTag, TogglTask,
    TogglTimeEntry, TogglUser, TogglWorkspace,
};

/// Convert a Toggl workspace to a canonical record.
pub fn to_workspace_record(workspace: &TogglWorkspace) -> EntityRecord {
    EntityRecord::new(
        EntityGroup::Workspaces,
        workspace.id.to_string(),
        &workspace.name,
        workspace.id.to_string(),
    )
}

/// Convert a Toggl client to a canonical record.
pub fn to_client_record(client: &TogglClientRecord) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::Clients,
        client.id.to_string(),
        &client.name,
        client.wid.to_string(),
    );
    record.is_active = !client.archived;
    record
}

/// Convert a Toggl project to a canonical record.
pub fn to_project_record(project: &TogglProject) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::Projects,
        project.id.to_string(),
        &project.name,
        project.workspace_id.to_string(),
    );
    record.client_id = project.client_id.map(|id| id.to_string());
    record.is_active = project.active;
    record.is_billable = project.billable;
    record
}

/// Convert a Toggl tag to a canonical record.
pub fn to_tag_record(tag: &TogglTag) -> EntityRecord {
    EntityRecord::new(
        EntityGroup::Tags,
        tag.id.to_string(),
        &tag.name,
        tag.workspace_id.to_string(),
    )
}

/// Convert a Toggl task to a canonical record.
pub fn to_task_record(task: &TogglTask) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::Tasks,
        task.id.to_string(),
        &task.name,
        task.workspace_id.to_string(),
    );
    record.project_id = Some(task.project_id.to_string());
    record.is_active = task.active;
    record
}

/// Convert a Toggl workspace user to a canonical record.
pub fn to_user_record(user: &TogglUser, workspace_id: i64) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::Users,
        user.id.to_string(),
        &user.fullname,
        workspace_id.to_string(),
    );
    record.email = Some(user.email.clone());
    record.is_active = !user.inactive;
    record
}

/// Convert a Toggl group to a canonical record.
pub fn to_group_record(group: &TogglGroup, workspace_id: i64) -> EntityRecord {
    EntityRecord::new(
        EntityGroup::UserGroups,
        group.id.to_string(),
        &group.name,
        workspace_id.to_string(),
    )
}

/// Convert a detailed-report time entry to a canonical record.
pub fn to_time_entry_record(entry: &TogglReportEntry, workspace_id: i64) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::TimeEntries,
        entry.id.to_string(),
        &entry.description,
        workspace_id.to_string(),
    );
    record.start = Some(entry.start);
    record.end = entry.end;
    record.project_id = entry.pid.map(|id| id.to_string());
    record.task_id = entry.tid.map(|id| id.to_string());
    record.user_id = entry.uid.map(|id| id.to_string());
    record.tag_ids = entry.tag_ids.iter().map(|id| id.to_string()).collect();
    record.is_billable = entry.billable;
    record
}

/// Convert a track-API time entry to a canonical record.
pub fn to_track_time_entry_record(entry: &TogglTimeEntry) -> EntityRecord {
    let mut record = EntityRecord::new(
        EntityGroup::TimeEntries,
        entry.id.to_string(),
        &entry.description,
        entry.workspace_id.to_string(),
    );
    record.start = Some(entry.start);
    record.end = entry.stop;
    record.project_id = entry.project_id.map(|id| id.to_string());
    record.task_id = entry.task_id.map(|id| id.to_string());
    record.user_id = entry.user_id.map(|id| id.to_string());
    record.tag_ids = entry.tag_ids.iter().map(|id| id.to_string()).collect();
    record.is_billable = entry.billable;
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_conversion() {
        let project = TogglProject {
            id: 7,
            workspace_id: 1,
            client_id: Some(3),
            name: "Apollo".to_string(),
            active: false,
            billable: true,
        };

        let record = to_project_record(&project);

        assert_eq!(record.group, EntityGroup::Projects);
        assert_eq!(record.id, "7");
        assert_eq!(record.workspace_id, "1");
        assert_eq!(record.client_id.as_deref(), Some("3"));
        assert!(!record.is_active);
        assert!(record.is_billable);
        assert!(record.linked_id.is_none());
        assert!(record.is_included);
    }

    #[test]
    fn test_user_conversion_carries_email() {
        let user = TogglUser {
            id: 42,
            fullname: "Jo Smith".to_string(),
            email: "jo@example.com".to_string(),
            inactive: false,
        };

        let record = to_user_record(&user, 1);

        assert_eq!(record.group, EntityGroup::Users);
        assert_eq!(record.email.as_deref(), Some("jo@example.com"));
        assert_eq!(record.match_key(), "jo@example.com");
    }

    #[test]
    fn test_time_entry_conversion() {
        let entry = TogglReportEntry {
            id: 555,
            description: "Standup".to_string(),
            start: "2024-03-11T09:00:00Z".parse().unwrap(),
            end: Some("2024-03-11T09:15:00Z".parse().unwrap()),
            pid: Some(7),
            tid: None,
            uid: Some(42),
            billable: true,
            tag_ids: vec![3],
        };

        let record = to_time_entry_record(&entry, 1);

        assert_eq!(record.group, EntityGroup::TimeEntries);
        assert_eq!(record.name, "Standup");
        assert_eq!(record.project_id.as_deref(), Some("7"));
        assert!(record.task_id.is_none());
        assert_eq!(record.user_id.as_deref(), Some("42"));
        assert_eq!(record.tag_ids, vec!["3".to_string()]);
        assert!(record.is_billable);
    }

    #[test]
    fn test_workspace_conversion_defaults_to_excluded() {
        let workspace = TogglWorkspace {
            id: 1,
            name: "Main".to_string(),
        };

        let record = to_workspace_record(&workspace);
        assert!(!record.is_included);
    }
}
