use std::collections::{HashMap, HashSet};

use crate::model::{IndexStats, Record};

/// avs → operator → snapshots, built once from the reference collection.
///
/// The outer map owns the per-AVS maps, which own the snapshot sets.
/// Duplicate reference records are stored once and counted in
/// [`IndexStats::duplicates`].
#[derive(Debug, Default)]
pub struct GroupIndex {
    groups: HashMap<String, HashMap<String, HashSet<String>>>,
    stats: IndexStats,
}

impl GroupIndex {
    pub fn build(reference: &[Record]) -> Self {
        let mut groups: HashMap<String, HashMap<String, HashSet<String>>> = HashMap::new();
        let mut stats = IndexStats::default();

        for record in reference {
            let operators = groups.entry(record.avs.clone()).or_insert_with(|| {
                stats.avs_count += 1;
                HashMap::new()
            });
            let snapshots = operators.entry(record.operator.clone()).or_insert_with(|| {
                stats.pair_count += 1;
                HashSet::new()
            });
            if snapshots.insert(record.snapshot.clone()) {
                stats.snapshot_count += 1;
            } else {
                stats.duplicates += 1;
            }
        }

        log::debug!(
            "index: {} avs, {} (avs, operator) pair(s), {} snapshot(s)",
            stats.avs_count,
            stats.pair_count,
            stats.snapshot_count,
        );
        if stats.duplicates > 0 {
            log::warn!("index: {} duplicate reference record(s) ignored", stats.duplicates);
        }

        Self { groups, stats }
    }

    /// Snapshots recorded for `(avs, operator)`, or `None` if the pair is unknown.
    pub fn snapshots(&self, avs: &str, operator: &str) -> Option<&HashSet<String>> {
        self.groups.get(avs).and_then(|operators| operators.get(operator))
    }

    pub fn contains(&self, avs: &str, operator: &str, snapshot: &str) -> bool {
        self.snapshots(avs, operator)
            .is_some_and(|snapshots| snapshots.contains(snapshot))
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_reference() {
        let index = GroupIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.stats(), IndexStats::default());
        assert!(index.snapshots("avsA", "op1").is_none());
    }

    #[test]
    fn groups_by_avs_then_operator() {
        let reference = vec![
            Record::new("op1", "avsA", "2024-01-01"),
            Record::new("op1", "avsA", "2024-01-02"),
            Record::new("op2", "avsA", "2024-01-01"),
            Record::new("op1", "avsB", "2024-01-01"),
        ];
        let index = GroupIndex::build(&reference);

        let stats = index.stats();
        assert_eq!(stats.avs_count, 2);
        assert_eq!(stats.pair_count, 3);
        assert_eq!(stats.snapshot_count, 4);
        assert_eq!(stats.duplicates, 0);

        assert_eq!(index.snapshots("avsA", "op1").map(|s| s.len()), Some(2));
        assert!(index.contains("avsB", "op1", "2024-01-01"));
        assert!(!index.contains("avsB", "op1", "2024-01-02"));
        assert!(index.snapshots("avsB", "op2").is_none());
    }

    #[test]
    fn duplicates_stored_once() {
        let reference = vec![
            Record::new("op1", "avsA", "2024-01-01"),
            Record::new("op1", "avsA", "2024-01-01"),
            Record::new("op1", "avsA", "2024-01-01"),
        ];
        let index = GroupIndex::build(&reference);
        assert_eq!(index.snapshots("avsA", "op1").map(|s| s.len()), Some(1));
        assert_eq!(index.stats().snapshot_count, 1);
        assert_eq!(index.stats().duplicates, 2);
    }

    #[test]
    fn fields_are_not_interchangeable() {
        // operator and avs swapped must not match
        let index = GroupIndex::build(&[Record::new("x", "y", "s")]);
        assert!(index.contains("y", "x", "s"));
        assert!(!index.contains("x", "y", "s"));
    }
}
