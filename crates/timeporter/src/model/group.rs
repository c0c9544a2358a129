use std::fmt;

use serde::{Deserialize, Serialize};

/// The entity groups the engine can transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityGroup {
    Workspaces,
    Clients,
    Projects,
    Tags,
    Tasks,
    Users,
    UserGroups,
    TimeEntries,
}

impl EntityGroup {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityGroup::Workspaces => "workspaces",
            EntityGroup::Clients => "clients",
            EntityGroup::Projects => "projects",
            EntityGroup::Tags => "tags",
            EntityGroup::Tasks => "tasks",
            EntityGroup::Users => "users",
            EntityGroup::UserGroups => "user-groups",
            EntityGroup::TimeEntries => "time-entries",
        }
    }
}

impl fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workspace-scoped groups in the order they must be transferred.
///
/// Projects reference clients, tasks reference projects, and time entries
/// reference projects, tasks, tags and users, so creation must run in this
/// exact order. Workspaces are not listed: the coordinator ensures the
/// workspace itself before any group is touched.
pub const TRANSFER_ORDER: [EntityGroup; 7] = [
    EntityGroup::Clients,
    EntityGroup::Projects,
    EntityGroup::Tags,
    EntityGroup::Tasks,
    EntityGroup::Users,
    EntityGroup::UserGroups,
    EntityGroup::TimeEntries,
];

/// Which side of a sync run a record set belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mapping {
    Source,
    Target,
}

impl Mapping {
    /// The other side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Mapping::Source => Mapping::Target,
            Mapping::Target => Mapping::Source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_group_as_str() {
        assert_eq!(EntityGroup::Workspaces.as_str(), "workspaces");
        assert_eq!(EntityGroup::UserGroups.as_str(), "user-groups");
        assert_eq!(EntityGroup::TimeEntries.as_str(), "time-entries");
    }

    #[test]
    fn test_transfer_order_puts_dependencies_first() {
        let order = TRANSFER_ORDER;

        let pos = |g: EntityGroup| order.iter().position(|&o| o == g).unwrap();

        assert!(pos(EntityGroup::Clients) < pos(EntityGroup::Projects));
        assert!(pos(EntityGroup::Projects) < pos(EntityGroup::Tasks));
        assert!(pos(EntityGroup::Tags) < pos(EntityGroup::TimeEntries));
        assert!(pos(EntityGroup::Users) < pos(EntityGroup::TimeEntries));
        assert_eq!(*order.last().unwrap(), EntityGroup::TimeEntries);
    }

    #[test]
    fn test_mapping_opposite() {
        assert_eq!(Mapping::Source.opposite(), Mapping::Target);
        assert_eq!(Mapping::Target.opposite(), Mapping::Source);
    }
}
