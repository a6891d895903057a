//! Counted-node set threaded through the counting passes

use crate::features::dependency_graph::NodeId;
use rustc_hash::FxHashSet;

/// Nodes already accounted for within one analysis run
///
/// Sources and Mem nodes land here once; later passes sharing the set skip
/// them. Reset it between unrelated runs, never between the passes of a run.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    nodes: FxHashSet<NodeId>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Returns `true` when `id` was not yet present
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.nodes.insert(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
