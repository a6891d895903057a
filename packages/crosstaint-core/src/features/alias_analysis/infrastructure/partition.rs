//! Disjoint alias partition, usable as the engine's alias oracle

use crate::features::alias_analysis::domain::AliasClass;
use crate::shared::models::Value;
use crate::shared::ports::{AliasKey, AliasOracle};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct AliasPartition {
    classes: Vec<AliasClass>,
    index: FxHashMap<Value, AliasKey>,
}

impl AliasPartition {
    /// Build from merged `(members, points_to)` pairs; keys follow the order
    /// of the smallest member
    pub(crate) fn from_merged(mut merged: Vec<(Vec<Value>, Vec<Value>)>) -> Self {
        merged.sort_by(|a, b| a.0.first().cmp(&b.0.first()));
        let mut partition = Self::default();
        for (members, points_to) in merged {
            partition.push(members, points_to);
        }
        partition
    }

    /// Build from classes that are already disjoint
    ///
    /// A value listed in more than one class stays in the first one.
    pub fn from_classes(classes: impl IntoIterator<Item = Vec<Value>>) -> Self {
        let mut partition = Self::default();
        for members in classes {
            let members: Vec<Value> = members
                .into_iter()
                .filter(|v| !partition.index.contains_key(v))
                .collect();
            if !members.is_empty() {
                partition.push(members, Vec::new());
            }
        }
        partition
    }

    fn push(&mut self, mut members: Vec<Value>, points_to: Vec<Value>) {
        members.sort_unstable();
        members.dedup();
        let key = AliasKey(self.classes.len() as u32);
        for member in &members {
            self.index.insert(*member, key);
        }
        self.classes.push(AliasClass {
            key,
            members,
            points_to,
        });
    }

    pub fn classes(&self) -> &[AliasClass] {
        &self.classes
    }

    pub fn class(&self, key: AliasKey) -> Option<&AliasClass> {
        self.classes.get(key.0 as usize)
    }
}

impl AliasOracle for AliasPartition {
    fn alias_set_key(&self, value: Value) -> Option<AliasKey> {
        self.index.get(&value).copied()
    }

    fn values_in_set(&self, key: AliasKey) -> Option<&[Value]> {
        self.class(key).map(|c| c.members.as_slice())
    }
}
