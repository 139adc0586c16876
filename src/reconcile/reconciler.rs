use super::types::{NameCollision, Reconciliation, TransferItem};
use crate::archive::ArchiveSnapshot;
use crate::source::SourceEntry;
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// Selects the source entries whose synthetic name is absent from the archive.
///
/// Presence by exact name is the only criterion: no content comparison, no
/// other filtering. The function is pure and its output is ordered by
/// synthetic name, so identical inputs always produce identical results.
///
/// When two entries map to the same synthetic name (identical committer
/// timestamps for one base name), the first one is kept and the pair is
/// reported in [`Reconciliation::collisions`]. That revision is otherwise
/// skipped silently, so it is surfaced rather than resolved.
///
/// # Arguments
///
/// * `entries` - Every revision found on the source side.
/// * `archived` - The archive snapshot taken for this run.
///
/// # Returns
///
/// A [`Reconciliation`] with the transfer set and the counts for the summary.
pub fn reconcile(entries: &[SourceEntry], archived: &ArchiveSnapshot) -> Reconciliation {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut result = Reconciliation::default();

    for entry in entries {
        let name = entry.synthetic_name();
        if let Some(kept) = seen.get(&name) {
            if *kept != entry.revision_id {
                warn!(
                    "Revisions {} and {} of {} share the name {}; only {} will be archived",
                    kept, entry.revision_id, entry.base_name, name, kept
                );
                result.collisions.push(NameCollision {
                    synthetic_name: name,
                    kept_revision: kept.to_string(),
                    dropped_revision: entry.revision_id.clone(),
                });
            }
            continue;
        }
        seen.insert(name.clone(), &entry.revision_id);

        if archived.contains(&name) {
            debug!("{} is already archived", name);
            result.already_archived += 1;
        } else {
            result.transfer_set.insert(
                name.clone(),
                TransferItem {
                    synthetic_name: name,
                    retrieval_location: entry.retrieval_location.clone(),
                    revision_id: entry.revision_id.clone(),
                },
            );
        }
    }

    info!(
        "Reconciled {} candidates: {} already archived, {} to transfer",
        result.candidates(),
        result.already_archived,
        result.transfer_set.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveEntry;
    use crate::reconcile::synthetic_name;

    fn entry(base_name: &str, revision_id: &str, ts: &str) -> SourceEntry {
        SourceEntry {
            base_name: base_name.to_string(),
            revision_id: revision_id.to_string(),
            revision_timestamp: ts.parse().unwrap(),
            retrieval_location: format!(
                "https://github.com/o/r/raw/{}/data/{}",
                revision_id, base_name
            ),
        }
    }

    fn snapshot(names: &[&str]) -> ArchiveSnapshot {
        names
            .iter()
            .map(|n| ArchiveEntry {
                name: n.to_string(),
                updated_at: None,
            })
            .collect()
    }

    #[test]
    fn test_only_unarchived_entries_are_selected() {
        let entries = vec![
            entry("a.csv", "rev1", "2025-02-18T23:25:13Z"),
            entry("b.csv", "rev1", "2025-02-18T23:25:13Z"),
        ];
        let archived = snapshot(&["a_2025-02-18T232513.csv"]);

        let result = reconcile(&entries, &archived);
        assert_eq!(
            result.transfer_set.keys().collect::<Vec<_>>(),
            vec!["b_2025-02-18T232513.csv"]
        );
        assert_eq!(result.already_archived, 1);
        assert_eq!(result.candidates(), 2);
    }

    #[test]
    fn test_output_is_exactly_the_set_difference() {
        let entries = vec![
            entry("contracts.csv", "c3", "2025-03-01T00:00:00Z"),
            entry("contracts.csv", "c2", "2025-02-01T00:00:00Z"),
            entry("contracts.csv", "c1", "2025-01-01T00:00:00Z"),
            entry("grants.csv", "g1", "2025-01-15T12:30:00Z"),
            entry("leases.csv", "l1", "2025-01-20T08:00:00Z"),
        ];
        let archived = snapshot(&[
            "contracts_2025-01-01T000000.csv",
            "leases_2025-01-20T080000.csv",
            "legacy-upload.csv",
        ]);

        let result = reconcile(&entries, &archived);
        for e in &entries {
            let name = e.synthetic_name();
            assert_eq!(
                result.transfer_set.contains_key(&name),
                !archived.contains(&name),
                "{}",
                name
            );
        }
        assert_eq!(result.transfer_set.len(), 3);
        assert!(!result.transfer_set.contains_key("legacy-upload.csv"));
    }

    #[test]
    fn test_reconcile_is_pure() {
        let entries = vec![
            entry("b.csv", "rev2", "2025-02-19T10:00:00Z"),
            entry("a.csv", "rev1", "2025-02-18T23:25:13Z"),
        ];
        let archived = snapshot(&[]);
        let first = reconcile(&entries, &archived);
        let second = reconcile(&entries, &archived);
        assert_eq!(first, second);
    }

    #[test]
    fn test_transfer_set_is_sorted_by_name() {
        let entries = vec![
            entry("z.csv", "rev1", "2025-02-18T23:25:13Z"),
            entry("a.csv", "rev1", "2025-02-18T23:25:13Z"),
            entry("m.csv", "rev1", "2025-02-18T23:25:13Z"),
        ];
        let result = reconcile(&entries, &snapshot(&[]));
        let names: Vec<_> = result.transfer_set.keys().cloned().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_fully_archived_source_yields_empty_set() {
        let entries = vec![entry("a.csv", "rev1", "2025-02-18T23:25:13Z")];
        let name = synthetic_name("a.csv", &entries[0].revision_timestamp);
        let archived = snapshot(&[name.as_str()]);
        let result = reconcile(&entries, &archived);
        assert!(result.is_empty());
        assert_eq!(result.already_archived, 1);
    }

    #[test]
    fn test_identical_timestamps_are_reported_as_collision() {
        let entries = vec![
            entry("a.csv", "first", "2025-02-18T23:25:13Z"),
            entry("a.csv", "second", "2025-02-18T23:25:13Z"),
        ];
        let result = reconcile(&entries, &snapshot(&[]));
        assert_eq!(result.transfer_set.len(), 1);
        assert_eq!(result.transfer_set["a_2025-02-18T232513.csv"].revision_id, "first");
        assert_eq!(
            result.collisions,
            vec![NameCollision {
                synthetic_name: "a_2025-02-18T232513.csv".to_string(),
                kept_revision: "first".to_string(),
                dropped_revision: "second".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicate_entry_is_not_a_collision() {
        let entries = vec![
            entry("a.csv", "rev1", "2025-02-18T23:25:13Z"),
            entry("a.csv", "rev1", "2025-02-18T23:25:13Z"),
        ];
        let result = reconcile(&entries, &snapshot(&[]));
        assert_eq!(result.transfer_set.len(), 1);
        assert!(result.collisions.is_empty());
    }
}
