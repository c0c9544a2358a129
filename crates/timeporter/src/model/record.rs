use chrono::{DateTime, Utc};

use super::group::EntityGroup;

/// A record from either service, normalized to one shape (service-agnostic
/// representation).
///
/// Group-specific fields are optional and only populated for the groups that
/// carry them. Ids are the service's own ids, kept as strings: Toggl uses
/// numeric ids and Clockify uses hex strings, and nothing in the engine ever
/// does arithmetic on them.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    /// Service-assigned id, unique within its service and entity group.
    pub id: String,
    /// Name used for matching. Time entries store their description here.
    pub name: String,
    /// Owning workspace id, within the same service.
    pub workspace_id: String,
    /// Id of the corresponding record in the other service, once linked.
    pub linked_id: Option<String>,
    /// Whether this record should be created in the other service.
    pub is_included: bool,
    /// Which entity group this record belongs to.
    pub group: EntityGroup,

    /// Email address (Users; the match field for that group).
    pub email: Option<String>,
    /// Owning client id (Projects).
    pub client_id: Option<String>,
    /// Owning project id (Tasks, TimeEntries).
    pub project_id: Option<String>,
    /// Owning task id (TimeEntries).
    pub task_id: Option<String>,
    /// Attached tag ids (TimeEntries).
    pub tag_ids: Vec<String>,
    /// Owning user id (TimeEntries).
    pub user_id: Option<String>,
    /// Member user ids (Workspaces, UserGroups).
    pub user_ids: Vec<String>,
    /// Start timestamp (TimeEntries).
    pub start: Option<DateTime<Utc>>,
    /// End timestamp (TimeEntries).
    pub end: Option<DateTime<Utc>>,
    /// Whether the entry is billable (TimeEntries).
    pub is_billable: bool,
    /// Whether the record is active/archived (Projects, Tasks, Users).
    pub is_active: bool,
}

impl EntityRecord {
    /// Create a record with group defaults.
    ///
    /// Unmatched records are transfer candidates by default. Workspaces are
    /// not: they sit at the root of the hierarchy and must be opted in
    /// explicitly before anything is created on their behalf.
    #[must_use]
    pub fn new(
        group: EntityGroup,
        id: impl Into<String>,
        name: impl Into<String>,
        workspace_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            workspace_id: workspace_id.into(),
            linked_id: None,
            is_included: group != EntityGroup::Workspaces,
            group,
            email: None,
            client_id: None,
            project_id: None,
            task_id: None,
            tag_ids: Vec::new(),
            user_id: None,
            user_ids: Vec::new(),
            start: None,
            end: None,
            is_billable: false,
            is_active: true,
        }
    }

    /// Whether a counterpart in the other service is known.
    #[inline]
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.linked_id.is_some()
    }

    /// The field two records of this group are matched on: `email` for
    /// users, `name` for everything else.
    #[must_use]
    pub fn match_key(&self) -> &str {
        if self.group == EntityGroup::Users {
            self.email.as_deref().unwrap_or(&self.name)
        } else {
            &self.name
        }
    }

    /// Establish the pairwise link between a source record and its target
    /// counterpart. Both sides get the other's id and drop out of the
    /// transfer set.
    pub fn link_pair(source: &mut EntityRecord, target: &mut EntityRecord) {
        source.linked_id = Some(target.id.clone());
        source.is_included = false;
        target.linked_id = Some(source.id.clone());
        target.is_included = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults_include_everything_but_workspaces() {
        let client = EntityRecord::new(EntityGroup::Clients, "c1", "Acme", "w1");
        assert!(client.is_included);
        assert!(!client.is_linked());

        let workspace = EntityRecord::new(EntityGroup::Workspaces, "w1", "Main", "w1");
        assert!(!workspace.is_included);
    }

    #[test]
    fn test_match_key_uses_email_for_users() {
        let mut user = EntityRecord::new(EntityGroup::Users, "u1", "Jo Smith", "w1");
        user.email = Some("jo@example.com".to_string());
        assert_eq!(user.match_key(), "jo@example.com");

        // Without an email the name is the best available key.
        let bare = EntityRecord::new(EntityGroup::Users, "u2", "Sam", "w1");
        assert_eq!(bare.match_key(), "Sam");

        let tag = EntityRecord::new(EntityGroup::Tags, "t1", "billable", "w1");
        assert_eq!(tag.match_key(), "billable");
    }

    #[test]
    fn test_link_pair_is_symmetric_and_excludes_both_sides() {
        let mut source = EntityRecord::new(EntityGroup::Clients, "c1", "Acme", "w1");
        let mut target = EntityRecord::new(EntityGroup::Clients, "x9", "Acme", "w9");

        EntityRecord::link_pair(&mut source, &mut target);

        assert_eq!(source.linked_id.as_deref(), Some("x9"));
        assert_eq!(target.linked_id.as_deref(), Some("c1"));
        assert!(!source.is_included);
        assert!(!target.is_included);
    }
}
