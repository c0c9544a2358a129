use std::collections::HashMap;

use crate::model::{EntityGroup, EntityRecord};

use super::table::LinkTable;

/// Link source and target records of one entity group by field equality.
///
/// The match field is `email` for users and `name` for everything else. For
/// every group except workspaces, a pair additionally has to live in linked
/// workspaces: the source record's workspace must map, via the
/// already-computed workspace link table, to the target record's workspace.
/// Workspaces themselves match by name alone; they are top-level, and names
/// are assumed unique within an account.
///
/// Matched pairs get each other's id in `linked_id` and `is_included =
/// false` on both sides. Unmatched records keep their inclusion default:
/// included for every group except workspaces, which stay excluded until
/// explicitly opted in. Records that are already linked are left untouched,
/// so the pass is idempotent and newly created records can be fed back
/// through it.
///
/// Returns the number of linked source records after the pass.
pub fn link_records(
    group: EntityGroup,
    source: &mut [EntityRecord],
    target: &mut [EntityRecord],
    workspace_links: &LinkTable,
) -> usize {
    // Index unlinked target records by match key. Keys are cloned so the
    // index stays valid while records are mutated below.
    let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, record) in target.iter().enumerate() {
        if !record.is_linked() {
            by_key
                .entry(record.match_key().to_string())
                .or_default()
                .push(idx);
        }
    }

    for src in source.iter_mut() {
        if src.is_linked() {
            continue;
        }

        let Some(candidates) = by_key.get(src.match_key()) else {
            continue;
        };

        let matched = candidates.iter().copied().find(|&idx| {
            let tgt = &target[idx];
            if tgt.is_linked() {
                return false;
            }
            group == EntityGroup::Workspaces
                || workspace_links.target_of(&src.workspace_id) == Some(tgt.workspace_id.as_str())
        });

        if let Some(idx) = matched {
            EntityRecord::link_pair(src, &mut target[idx]);
        }
    }

    // Derive inclusion for whatever is still unmatched. Workspaces keep
    // their opt-in state instead of being re-included.
    if group != EntityGroup::Workspaces {
        for record in source.iter_mut().chain(target.iter_mut()) {
            if !record.is_linked() {
                record.is_included = true;
            }
        }
    }

    source.iter().filter(|r| r.is_linked()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str, name: &str, wid: &str) -> EntityRecord {
        EntityRecord::new(EntityGroup::Clients, id, name, wid)
    }

    fn workspace_links() -> LinkTable {
        let mut links = LinkTable::new();
        links.insert("w1", "ws-a");
        links
    }

    #[test]
    fn test_matches_by_name_within_linked_workspaces() {
        let mut source = vec![client("c1", "Acme", "w1"), client("c2", "Globex", "w1")];
        let mut target = vec![client("x1", "Acme", "ws-a")];

        let matched = link_records(
            EntityGroup::Clients,
            &mut source,
            &mut target,
            &workspace_links(),
        );

        assert_eq!(matched, 1);
        assert_eq!(source[0].linked_id.as_deref(), Some("x1"));
        assert_eq!(target[0].linked_id.as_deref(), Some("c1"));
        assert!(!source[0].is_included);
        assert!(!target[0].is_included);

        // Unmatched source stays a transfer candidate.
        assert!(source[1].linked_id.is_none());
        assert!(source[1].is_included);
    }

    #[test]
    fn test_same_name_in_unlinked_workspace_does_not_match() {
        let mut source = vec![client("c1", "Acme", "w1")];
        // Target client lives in a workspace the link table doesn't map to.
        let mut target = vec![client("x1", "Acme", "ws-other")];

        let matched = link_records(
            EntityGroup::Clients,
            &mut source,
            &mut target,
            &workspace_links(),
        );

        assert_eq!(matched, 0);
        assert!(source[0].linked_id.is_none());
        assert!(target[0].linked_id.is_none());
    }

    #[test]
    fn test_workspaces_match_by_name_alone() {
        let mut source = vec![EntityRecord::new(
            EntityGroup::Workspaces,
            "w1",
            "Main",
            "w1",
        )];
        let mut target = vec![EntityRecord::new(
            EntityGroup::Workspaces,
            "ws-a",
            "Main",
            "ws-a",
        )];

        let matched = link_records(
            EntityGroup::Workspaces,
            &mut source,
            &mut target,
            &LinkTable::new(),
        );

        assert_eq!(matched, 1);
        assert_eq!(source[0].linked_id.as_deref(), Some("ws-a"));
    }

    #[test]
    fn test_unmatched_workspace_stays_excluded() {
        let mut source = vec![EntityRecord::new(
            EntityGroup::Workspaces,
            "w2",
            "Side project",
            "w2",
        )];
        let mut target: Vec<EntityRecord> = Vec::new();

        link_records(
            EntityGroup::Workspaces,
            &mut source,
            &mut target,
            &LinkTable::new(),
        );

        assert!(source[0].linked_id.is_none());
        assert!(!source[0].is_included);
    }

    #[test]
    fn test_users_match_by_email_not_name() {
        let mut src_user = EntityRecord::new(EntityGroup::Users, "u1", "Jo Smith", "w1");
        src_user.email = Some("jo@example.com".to_string());

        // Different display name, same email.
        let mut tgt_user = EntityRecord::new(EntityGroup::Users, "m1", "Joanna S.", "ws-a");
        tgt_user.email = Some("jo@example.com".to_string());

        let mut source = vec![src_user];
        let mut target = vec![tgt_user];

        let matched = link_records(
            EntityGroup::Users,
            &mut source,
            &mut target,
            &workspace_links(),
        );

        assert_eq!(matched, 1);
        assert_eq!(source[0].linked_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_duplicate_names_first_match_wins_and_consumes_target() {
        let mut source = vec![client("c1", "Acme", "w1"), client("c2", "Acme", "w1")];
        let mut target = vec![client("x1", "Acme", "ws-a")];

        let matched = link_records(
            EntityGroup::Clients,
            &mut source,
            &mut target,
            &workspace_links(),
        );

        // Only one pair: the target record can back a single link.
        assert_eq!(matched, 1);
        assert_eq!(source[0].linked_id.as_deref(), Some("x1"));
        assert!(source[1].linked_id.is_none());
        assert!(source[1].is_included);
    }

    #[test]
    fn test_relink_pass_is_idempotent() {
        let mut source = vec![client("c1", "Acme", "w1")];
        let mut target = vec![client("x1", "Acme", "ws-a")];
        let links = workspace_links();

        link_records(EntityGroup::Clients, &mut source, &mut target, &links);
        let first = (source[0].clone(), target[0].clone());

        link_records(EntityGroup::Clients, &mut source, &mut target, &links);

        assert_eq!(source[0], first.0);
        assert_eq!(target[0], first.1);
    }
}
