//! Network level model
//!
//! A level is one BFS layer of a function's simplified control-flow graph
//! (basic blocks plus the send or recv call sites of one direction). Call
//! sites are fingerprinted by the layers they occur at.

use crate::features::dependency_graph::domain::LevelSet;
use crate::shared::models::SourceLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vertex of a level graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelVertex {
    Block(u32),
    Call {
        callee: String,
        location: Option<SourceLocation>,
    },
}

impl LevelVertex {
    pub fn is_call(&self) -> bool {
        matches!(self, LevelVertex::Call { .. })
    }
}

/// Levels computed for one function and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionLevels {
    pub function: String,
    pub levels: Vec<Vec<LevelVertex>>,
}

/// Per program and direction: every function's levels plus the reverse
/// index `location -> levels`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramStructure {
    pub functions: Vec<FunctionLevels>,
    pub index: BTreeMap<SourceLocation, LevelSet>,
}

impl ProgramStructure {
    pub fn levels_at(&self, location: &SourceLocation) -> Option<&LevelSet> {
        self.index.get(location)
    }
}

/// Correlation rule: a send and a recv pair up iff their level-sets meet
#[inline]
pub fn levels_correlate(write: &LevelSet, read: &LevelSet) -> bool {
    !write.is_disjoint(read)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_correlate() {
        let a: LevelSet = [1, 3].into_iter().collect();
        let b: LevelSet = [3].into_iter().collect();
        let c: LevelSet = [2].into_iter().collect();
        assert!(levels_correlate(&a, &b));
        assert!(!levels_correlate(&a, &c));
        assert!(!levels_correlate(&LevelSet::new(), &a));
    }
}
