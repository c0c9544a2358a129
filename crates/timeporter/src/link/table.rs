use std::collections::HashMap;

use crate::model::EntityRecord;

/// Source-id → target-id lookup for one entity group.
///
/// Built from source-side records after a linking pass; used to resolve
/// cross-service references (a project's client, a task's project) and to
/// scope matching to the right workspace.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    map: HashMap<String, String>,
}

impl LinkTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from source-side records, keeping only linked ones.
    #[must_use]
    pub fn from_records(records: &[EntityRecord]) -> Self {
        let map = records
            .iter()
            .filter_map(|r| {
                r.linked_id
                    .as_ref()
                    .map(|linked| (r.id.clone(), linked.clone()))
            })
            .collect();
        Self { map }
    }

    /// Record a link.
    pub fn insert(&mut self, source_id: impl Into<String>, target_id: impl Into<String>) {
        self.map.insert(source_id.into(), target_id.into());
    }

    /// Resolve a source-side id to its target-side counterpart.
    #[must_use]
    pub fn target_of(&self, source_id: &str) -> Option<&str> {
        self.map.get(source_id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
