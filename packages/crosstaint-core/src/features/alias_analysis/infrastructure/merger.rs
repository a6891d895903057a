//! Fixed-point alias-set merging
//!
//! Turns raw, overlapping points-to sets into disjoint alias classes:
//!
//! 1. One singleton class per pointer id, seeded with the id's points-to set
//!    plus the id itself (a pointer aliases the storage it names)
//! 2. Scan every class pair; when two points-to sets intersect, fold the
//!    later class into the earlier one
//! 3. Repeat until a full scan merges nothing
//!
//! Quadratic per pass; `n` is the number of distinct pointer values of one
//! module, so this stays small.

use super::partition::AliasPartition;
use crate::features::alias_analysis::domain::MergeStats;
use crate::shared::models::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone)]
struct PendingClass {
    members: BTreeSet<Value>,
    points_to: BTreeSet<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct AliasSetMerger {
    raw: BTreeMap<Value, BTreeSet<Value>>,
}

impl AliasSetMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: BTreeMap<Value, BTreeSet<Value>>) -> Self {
        let mut merger = Self::new();
        for (pointer, targets) in raw {
            merger.add_points_to(pointer, targets);
        }
        merger
    }

    /// Record that `pointer` may alias each of `targets`
    ///
    /// Targets become ids of their own, so the result partitions every value
    /// the raw map mentions.
    pub fn add_points_to(&mut self, pointer: Value, targets: impl IntoIterator<Item = Value>) {
        let targets: Vec<Value> = targets.into_iter().collect();
        for target in &targets {
            self.raw.entry(*target).or_default();
        }
        self.raw.entry(pointer).or_default().extend(targets);
    }

    /// Every id the partition will cover
    pub fn ids(&self) -> impl Iterator<Item = Value> + '_ {
        self.raw.keys().copied()
    }

    pub fn merge(&self) -> AliasPartition {
        self.merge_with_stats().0
    }

    pub fn merge_with_stats(&self) -> (AliasPartition, MergeStats) {
        let mut classes: Vec<Option<PendingClass>> = self
            .raw
            .iter()
            .map(|(id, targets)| {
                let mut points_to = targets.clone();
                points_to.insert(*id);
                Some(PendingClass {
                    members: BTreeSet::from([*id]),
                    points_to,
                })
            })
            .collect();

        let mut stats = MergeStats {
            input_ids: classes.len(),
            ..MergeStats::default()
        };

        loop {
            stats.passes += 1;
            let mut merged = false;
            for i in 0..classes.len() {
                for j in (i + 1)..classes.len() {
                    let overlaps = match (&classes[i], &classes[j]) {
                        (Some(a), Some(b)) => !a.points_to.is_disjoint(&b.points_to),
                        _ => false,
                    };
                    if !overlaps {
                        continue;
                    }
                    if let Some(b) = classes[j].take() {
                        if let Some(a) = classes[i].as_mut() {
                            a.members.extend(b.members);
                            a.points_to.extend(b.points_to);
                        }
                        stats.merges += 1;
                        merged = true;
                    }
                }
            }
            if !merged {
                break;
            }
        }

        let classes: Vec<(Vec<Value>, Vec<Value>)> = classes
            .into_iter()
            .flatten()
            .map(|c| (c.members.into_iter().collect(), c.points_to.into_iter().collect()))
            .collect();
        stats.classes = classes.len();

        debug!(
            ids = stats.input_ids,
            classes = stats.classes,
            passes = stats.passes,
            "alias sets merged"
        );
        (AliasPartition::from_merged(classes), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::ProgramId;
    use crate::shared::ports::AliasOracle;

    fn v(id: u32) -> Value {
        Value::new(ProgramId::First, id)
    }

    #[test]
    fn test_overlapping_sets_merge() {
        let mut merger = AliasSetMerger::new();
        merger.add_points_to(v(1), [v(10)]);
        merger.add_points_to(v(2), [v(10), v(11)]);
        merger.add_points_to(v(3), [v(20)]);

        let partition = merger.merge();
        let k1 = partition.alias_set_key(v(1)).unwrap();
        assert_eq!(partition.alias_set_key(v(2)), Some(k1));
        assert_eq!(partition.alias_set_key(v(10)), Some(k1));
        assert_eq!(partition.alias_set_key(v(11)), Some(k1));
        assert_ne!(partition.alias_set_key(v(3)), Some(k1));
        assert_eq!(partition.alias_set_key(v(20)), partition.alias_set_key(v(3)));
    }

    #[test]
    fn test_transitive_merge_needs_fixed_point() {
        // 1~2 via 10, 2~3 via 11: all three end up together
        let mut merger = AliasSetMerger::new();
        merger.add_points_to(v(3), [v(11)]);
        merger.add_points_to(v(1), [v(10)]);
        merger.add_points_to(v(2), [v(10), v(11)]);

        let (partition, stats) = merger.merge_with_stats();
        assert_eq!(stats.classes, 1);
        assert!(stats.passes >= 1);
        let key = partition.alias_set_key(v(1)).unwrap();
        assert_eq!(partition.values_in_set(key).unwrap().len(), 5);
    }

    #[test]
    fn test_empty_input() {
        let (partition, stats) = AliasSetMerger::new().merge_with_stats();
        assert_eq!(stats.classes, 0);
        assert_eq!(stats.passes, 1);
        assert!(partition.classes().is_empty());
    }

    #[test]
    fn test_unrelated_pointers_stay_apart() {
        let mut merger = AliasSetMerger::new();
        merger.add_points_to(v(1), []);
        merger.add_points_to(v(2), []);
        let (partition, stats) = merger.merge_with_stats();
        assert_eq!(stats.classes, 2);
        assert_eq!(stats.merges, 0);
        assert_ne!(partition.alias_set_key(v(1)), partition.alias_set_key(v(2)));
    }
}
