use chrono::Duration;

use crate::model::EntityRecord;

use super::table::LinkTable;

/// How far apart two timestamps may be while still describing the same entry.
///
/// Imports and manual re-entry shift timestamps by a few seconds; a minute of
/// slack absorbs that without swallowing genuinely different entries.
const TIMESTAMP_TOLERANCE_SECS: i64 = 60;

/// Link time entries across services.
///
/// Two entries are the same when their descriptions are equal, their start
/// and end timestamps each fall within one minute of each other, and their
/// projects agree (both have none, or the source entry's project maps via
/// `project_links` to the target entry's project).
///
/// Both sides are walked in start order so each source entry only scans the
/// window of target entries within the timestamp tolerance. The first target
/// entry that qualifies wins (not the best one) and is consumed, so a
/// second identical source entry can never link to it again. Entries that
/// are near-duplicates of each other (two identical standups in one day)
/// are therefore paired in start order without further disambiguation.
///
/// Returns the number of linked source entries after the pass.
pub fn link_time_entries(
    source: &mut [EntityRecord],
    target: &mut [EntityRecord],
    project_links: &LinkTable,
) -> usize {
    let tolerance = Duration::seconds(TIMESTAMP_TOLERANCE_SECS);

    let mut src_order: Vec<usize> = (0..source.len()).collect();
    src_order.sort_by_key(|&i| source[i].start);
    let mut tgt_order: Vec<usize> = (0..target.len()).collect();
    tgt_order.sort_by_key(|&i| target[i].start);

    // Lower edge of the candidate window; only moves forward as source
    // starts increase.
    let mut window_start = 0usize;

    for &si in &src_order {
        if source[si].is_linked() {
            continue;
        }
        let Some(s_start) = source[si].start else {
            continue;
        };

        while window_start < tgt_order.len() {
            let ti = tgt_order[window_start];
            match target[ti].start {
                Some(t_start) if t_start >= s_start - tolerance => break,
                _ => window_start += 1,
            }
        }

        let mut matched: Option<usize> = None;
        for &ti in &tgt_order[window_start..] {
            let tgt = &target[ti];
            if tgt.is_linked() {
                continue;
            }
            let Some(t_start) = tgt.start else {
                continue;
            };
            if t_start > s_start + tolerance {
                break;
            }
            if tgt.name != source[si].name {
                continue;
            }

            let ends_agree = match (source[si].end, tgt.end) {
                (Some(s_end), Some(t_end)) => (s_end - t_end).abs() <= tolerance,
                (None, None) => true,
                _ => false,
            };
            if !ends_agree {
                continue;
            }

            let projects_agree = match (&source[si].project_id, &tgt.project_id) {
                (None, None) => true,
                (Some(sp), Some(tp)) => project_links.target_of(sp) == Some(tp.as_str()),
                _ => false,
            };
            if !projects_agree {
                continue;
            }

            matched = Some(ti);
            break;
        }

        if let Some(ti) = matched {
            EntityRecord::link_pair(&mut source[si], &mut target[ti]);
        }
    }

    // Unmatched entries on either side remain transfer candidates.
    for record in source.iter_mut().chain(target.iter_mut()) {
        if !record.is_linked() {
            record.is_included = true;
        }
    }

    source.iter().filter(|r| r.is_linked()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityGroup;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 9, minute, second).unwrap()
    }

    fn entry(
        id: &str,
        description: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EntityRecord {
        let mut record = EntityRecord::new(EntityGroup::TimeEntries, id, description, "w1");
        record.start = Some(start);
        record.end = Some(end);
        record
    }

    fn project_links() -> LinkTable {
        let mut links = LinkTable::new();
        links.insert("p1", "proj-a");
        links
    }

    #[test]
    fn test_links_entries_within_tolerance() {
        // Target drifted 30s on start and 20s on end; still the same entry.
        let mut source = vec![entry("e1", "Standup", at(0, 0), at(15, 0))];
        let mut target = vec![entry("f1", "Standup", at(0, 30), at(15, 20))];
        source[0].project_id = Some("p1".to_string());
        target[0].project_id = Some("proj-a".to_string());

        let matched = link_time_entries(&mut source, &mut target, &project_links());

        assert_eq!(matched, 1);
        assert_eq!(source[0].linked_id.as_deref(), Some("f1"));
        assert_eq!(target[0].linked_id.as_deref(), Some("e1"));
        assert!(!source[0].is_included);
    }

    #[test]
    fn test_start_outside_tolerance_does_not_link() {
        let mut source = vec![entry("e1", "Standup", at(0, 0), at(15, 0))];
        let mut target = vec![entry("f1", "Standup", at(2, 0), at(17, 0))];

        let matched = link_time_entries(&mut source, &mut target, &LinkTable::new());

        assert_eq!(matched, 0);
        assert!(source[0].linked_id.is_none());
        assert!(source[0].is_included);
    }

    #[test]
    fn test_different_description_does_not_link() {
        let mut source = vec![entry("e1", "Standup", at(0, 0), at(15, 0))];
        let mut target = vec![entry("f1", "Planning", at(0, 0), at(15, 0))];

        assert_eq!(
            link_time_entries(&mut source, &mut target, &LinkTable::new()),
            0
        );
    }

    #[test]
    fn test_project_mismatch_does_not_link() {
        let mut source = vec![entry("e1", "Standup", at(0, 0), at(15, 0))];
        let mut target = vec![entry("f1", "Standup", at(0, 0), at(15, 0))];
        source[0].project_id = Some("p1".to_string());
        // Target entry has no project at all.

        assert_eq!(
            link_time_entries(&mut source, &mut target, &project_links()),
            0
        );
    }

    #[test]
    fn test_running_entries_link_when_both_open() {
        let mut source = vec![entry("e1", "Focus", at(0, 0), at(15, 0))];
        let mut target = vec![entry("f1", "Focus", at(0, 10), at(15, 0))];
        source[0].end = None;
        target[0].end = None;

        assert_eq!(
            link_time_entries(&mut source, &mut target, &LinkTable::new()),
            1
        );
    }

    #[test]
    fn test_each_target_is_consumed_at_most_once() {
        // Two identical standups on the source side, one on the target side.
        let mut source = vec![
            entry("e1", "Standup", at(0, 0), at(15, 0)),
            entry("e2", "Standup", at(0, 20), at(15, 10)),
        ];
        let mut target = vec![entry("f1", "Standup", at(0, 10), at(15, 0))];

        let matched = link_time_entries(&mut source, &mut target, &LinkTable::new());

        assert_eq!(matched, 1);
        // First in start order wins; the second stays a transfer candidate.
        assert_eq!(source[0].linked_id.as_deref(), Some("f1"));
        assert!(source[1].linked_id.is_none());
        assert!(source[1].is_included);
    }

    #[test]
    fn test_first_match_wins_not_best_match() {
        let mut source = vec![entry("e1", "Standup", at(1, 0), at(16, 0))];
        // Both targets qualify; the earlier one is scanned first even though
        // the later one is the exact-timestamp match.
        let mut target = vec![
            entry("f1", "Standup", at(0, 30), at(15, 30)),
            entry("f2", "Standup", at(1, 0), at(16, 0)),
        ];

        let matched = link_time_entries(&mut source, &mut target, &LinkTable::new());

        assert_eq!(matched, 1);
        assert_eq!(source[0].linked_id.as_deref(), Some("f1"));
        assert!(target[1].linked_id.is_none());
    }

    #[test]
    fn test_relink_pass_is_idempotent() {
        let mut source = vec![entry("e1", "Standup", at(0, 0), at(15, 0))];
        let mut target = vec![entry("f1", "Standup", at(0, 30), at(15, 20))];
        let links = LinkTable::new();

        link_time_entries(&mut source, &mut target, &links);
        let first = (source[0].clone(), target[0].clone());

        link_time_entries(&mut source, &mut target, &links);

        assert_eq!(source[0], first.0);
        assert_eq!(target[0], first.1);
    }
}
