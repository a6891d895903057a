//! Alias class model

use crate::shared::models::Value;
use crate::shared::ports::AliasKey;
use serde::{Deserialize, Serialize};

/// One disjoint alias class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasClass {
    pub key: AliasKey,
    /// Pointer ids of the class, ascending
    pub members: Vec<Value>,
    /// Union of the members' points-to sets, ascending
    pub points_to: Vec<Value>,
}

impl AliasClass {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.members.binary_search(value).is_ok()
    }
}

/// Merge run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub input_ids: usize,
    pub classes: usize,
    /// Full scans over all class pairs, the last one merging nothing
    pub passes: usize,
    pub merges: usize,
}
