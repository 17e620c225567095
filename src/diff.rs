//! Baseline vs. current snapshot classification

use crate::snapshot::Snapshot;
use serde::Serialize;
use std::collections::BTreeSet;

/// Added, deleted and modified paths between two snapshots
///
/// The three sets are disjoint. Every path present in both snapshots with an
/// equal digest is unchanged and appears in none of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub added: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub unchanged: usize,
}

impl DiffReport {
    /// True when the current state matches the baseline exactly
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.added.len() + self.deleted.len() + self.modified.len()
    }
}

/// Classify every path in `baseline` and `current`
pub fn diff(baseline: &Snapshot, current: &Snapshot) -> DiffReport {
    let baseline_paths = baseline.paths();
    let current_paths = current.paths();

    let deleted = baseline_paths
        .difference(&current_paths)
        .map(|p| p.to_string())
        .collect();
    let added = current_paths
        .difference(&baseline_paths)
        .map(|p| p.to_string())
        .collect();

    let mut modified = BTreeSet::new();
    let mut unchanged = 0;
    for path in baseline_paths.intersection(&current_paths) {
        if baseline.get(path) != current.get(path) {
            modified.insert(path.to_string());
        } else {
            unchanged += 1;
        }
    }

    DiffReport {
        added,
        deleted,
        modified,
        unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(entries: &[(&str, &str)]) -> Snapshot {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_identical_snapshots_are_clean() {
        let s = snap(&[("a.txt", "01"), ("b.txt", "02")]);
        let report = diff(&s, &s);
        assert!(report.is_clean());
        assert_eq!(report.unchanged, 2);
        assert_eq!(report.total_changes(), 0);
    }

    #[test]
    fn test_empty_snapshots() {
        let report = diff(&Snapshot::new(), &Snapshot::new());
        assert!(report.is_clean());
        assert_eq!(report.unchanged, 0);
    }

    #[test]
    fn test_classification() {
        let baseline = snap(&[("same", "1"), ("changed", "2"), ("gone", "3")]);
        let current = snap(&[("same", "1"), ("changed", "9"), ("new", "4")]);

        let report = diff(&baseline, &current);
        assert_eq!(report.added, BTreeSet::from(["new".to_string()]));
        assert_eq!(report.deleted, BTreeSet::from(["gone".to_string()]));
        assert_eq!(report.modified, BTreeSet::from(["changed".to_string()]));
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.total_changes(), 3);
    }

    #[test]
    fn test_everything_added_against_empty_baseline() {
        let current = snap(&[("a", "1"), ("b", "2")]);
        let report = diff(&Snapshot::new(), &current);
        assert_eq!(report.added.len(), 2);
        assert!(report.deleted.is_empty());
        assert!(report.modified.is_empty());
    }

    #[test]
    fn test_everything_deleted_against_empty_current() {
        let baseline = snap(&[("a", "1"), ("b", "2")]);
        let report = diff(&baseline, &Snapshot::new());
        assert_eq!(report.deleted.len(), 2);
        assert!(report.added.is_empty());
    }

    #[test]
    fn test_rename_is_delete_plus_add() {
        let baseline = snap(&[("old_name.txt", "abc")]);
        let current = snap(&[("new_name.txt", "abc")]);
        let report = diff(&baseline, &current);
        assert_eq!(report.deleted, BTreeSet::from(["old_name.txt".to_string()]));
        assert_eq!(report.added, BTreeSet::from(["new_name.txt".to_string()]));
        assert!(report.modified.is_empty());
    }

    #[test]
    fn test_inputs_not_mutated() {
        let baseline = snap(&[("a", "1")]);
        let current = snap(&[("a", "2"), ("b", "3")]);
        let (b_before, c_before) = (baseline.clone(), current.clone());
        let _ = diff(&baseline, &current);
        assert_eq!(baseline, b_before);
        assert_eq!(current, c_before);
    }
}
