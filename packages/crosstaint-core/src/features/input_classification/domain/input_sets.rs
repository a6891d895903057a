//! Classified inputs
//!
//! Six sets in total: local-only, network-only and their union, for each of
//! the two programs. Sets are keyed by value so re-classifying a value never
//! duplicates it.

use super::primitive::PrimitiveKind;
use crate::shared::models::{PerProgram, ProgramId, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One classified input value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub value: Value,
    pub program: ProgramId,
    pub is_network: bool,
    /// Callee or function that introduced the input
    pub instruction_name: String,
    pub kind: PrimitiveKind,
}

impl InputRecord {
    pub fn new(value: Value, is_network: bool, instruction_name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self {
            value,
            program: value.program,
            is_network,
            instruction_name: instruction_name.into(),
            kind,
        }
    }
}

/// Which of a program's input sets to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputScope {
    Local,
    Network,
    All,
}

type RecordSet = BTreeMap<Value, InputRecord>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSets {
    local: PerProgram<RecordSet>,
    network: PerProgram<RecordSet>,
    all: PerProgram<RecordSet>,
}

impl InputSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert into the local or network set of the record's program, and the
    /// union. Returns `false` if the value was already in that set.
    pub fn insert(&mut self, record: InputRecord) -> bool {
        let program = record.program;
        let target = if record.is_network {
            self.network.get_mut(program)
        } else {
            self.local.get_mut(program)
        };
        if target.contains_key(&record.value) {
            return false;
        }
        target.insert(record.value, record.clone());
        self.all.get_mut(program).entry(record.value).or_insert(record);
        true
    }

    fn set(&self, program: ProgramId, scope: InputScope) -> &RecordSet {
        match scope {
            InputScope::Local => self.local.get(program),
            InputScope::Network => self.network.get(program),
            InputScope::All => self.all.get(program),
        }
    }

    pub fn records(&self, program: ProgramId, scope: InputScope) -> impl Iterator<Item = &InputRecord> + '_ {
        self.set(program, scope).values()
    }

    pub fn contains(&self, program: ProgramId, scope: InputScope, value: Value) -> bool {
        self.set(program, scope).contains_key(&value)
    }

    pub fn len(&self, program: ProgramId, scope: InputScope) -> usize {
        self.set(program, scope).len()
    }

    pub fn is_empty(&self) -> bool {
        ProgramId::ALL
            .iter()
            .all(|p| self.all.get(*p).is_empty())
    }

    /// Every record of both sets (a value can appear once per origin)
    pub fn iter(&self) -> impl Iterator<Item = &InputRecord> + '_ {
        ProgramId::ALL.into_iter().flat_map(move |p| {
            self.local
                .get(p)
                .values()
                .chain(self.network.get(p).values())
        })
    }

    /// Merge another classification result into this one
    pub fn extend(&mut self, other: InputSets) {
        for program in ProgramId::ALL {
            for record in other.local.get(program).values().chain(other.network.get(program).values()) {
                self.insert(record.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(program: ProgramId, id: u32, is_network: bool) -> InputRecord {
        InputRecord::new(Value::new(program, id), is_network, "read", PrimitiveKind::RawByteRead)
    }

    #[test]
    fn test_insert_routes_by_origin_and_program() {
        let mut sets = InputSets::new();
        assert!(sets.insert(record(ProgramId::First, 1, false)));
        assert!(sets.insert(record(ProgramId::First, 2, true)));
        assert!(sets.insert(record(ProgramId::Second, 1, true)));

        assert_eq!(sets.len(ProgramId::First, InputScope::Local), 1);
        assert_eq!(sets.len(ProgramId::First, InputScope::Network), 1);
        assert_eq!(sets.len(ProgramId::First, InputScope::All), 2);
        assert_eq!(sets.len(ProgramId::Second, InputScope::Local), 0);
        assert_eq!(sets.len(ProgramId::Second, InputScope::All), 1);
    }

    #[test]
    fn test_insert_deduplicates_by_value() {
        let mut sets = InputSets::new();
        assert!(sets.insert(record(ProgramId::First, 1, false)));
        assert!(!sets.insert(record(ProgramId::First, 1, false)));
        // same value, other origin: kept once in the union
        assert!(sets.insert(record(ProgramId::First, 1, true)));
        assert_eq!(sets.len(ProgramId::First, InputScope::All), 1);
        assert_eq!(sets.iter().count(), 2);
    }

    #[test]
    fn test_extend_merges() {
        let mut a = InputSets::new();
        a.insert(record(ProgramId::First, 1, false));
        let mut b = InputSets::new();
        b.insert(record(ProgramId::Second, 4, true));
        a.extend(b);
        assert!(a.contains(ProgramId::Second, InputScope::Network, Value::new(ProgramId::Second, 4)));
        assert!(!a.is_empty());
    }
}
