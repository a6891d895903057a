use crate::features::dependency_graph::NodeId;
use std::collections::BTreeSet;

/// Outcome of one counting pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundCheckCount {
    /// Sum of the access counts of every Mem node counted by this pass
    pub count: u64,
    /// Source -> Mem traces that contributed to `count`
    pub paths: Vec<Vec<NodeId>>,
    /// Mem nodes counted by this pass
    pub counted: BTreeSet<NodeId>,
}

impl BoundCheckCount {
    pub fn is_empty(&self) -> bool {
        self.counted.is_empty()
    }
}
