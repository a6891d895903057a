//! Graph statistics

use super::graph::DependencyGraph;
use crate::features::dependency_graph::domain::{EdgeKind, NodeCategory};
use crate::shared::models::{PerProgram, ProgramId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub nodes_by_kind: BTreeMap<NodeCategory, usize>,
    pub data_edges: usize,
    pub control_edges: usize,
    /// Edges whose endpoints belong to different programs
    pub cross_program_edges: usize,
    /// Sum of Mem node access counts per program (array-bound checks)
    pub array_checks: PerProgram<u64>,
}

impl DependencyGraph {
    /// Sum of the access counts of every Mem node of `program`
    pub fn array_count(&self, program: ProgramId) -> u64 {
        self.mem_nodes_of(program).map(|n| u64::from(n.count)).sum()
    }

    pub fn get_stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            ..GraphStats::default()
        };

        for node in self.nodes() {
            *stats.nodes_by_kind.entry(node.category()).or_insert(0) += 1;
            for (succ, kind) in node.successors() {
                match kind {
                    EdgeKind::Data => stats.data_edges += 1,
                    EdgeKind::Control => stats.control_edges += 1,
                }
                if self.node(*succ).map(|s| s.program != node.program).unwrap_or(false) {
                    stats.cross_program_edges += 1;
                }
            }
        }

        for program in ProgramId::ALL {
            *stats.array_checks.get_mut(program) = self.array_count(program);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dependency_graph::domain::NodeKind;
    use crate::shared::models::Value;
    use crate::shared::ports::AliasKey;

    #[test]
    fn test_stats_counts_kinds_and_cross_edges() {
        let mut g = DependencyGraph::new();
        let v = Value::new(ProgramId::First, 0);
        let a = g.add_node(ProgramId::First, NodeKind::Var { value: v }, "a").unwrap();
        let m1 = g.mem_node(ProgramId::First, AliasKey(0), "m1").unwrap();
        let m2 = g.mem_node(ProgramId::Second, AliasKey(0), "m2").unwrap();
        g.connect(a, m1, EdgeKind::Data);
        g.connect(m1, m2, EdgeKind::Control);
        if let Some(n) = g.node_mut(m1) {
            n.count = 3;
        }
        if let Some(n) = g.node_mut(m2) {
            n.count = 2;
        }

        let stats = g.get_stats();
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.edges, 2);
        assert_eq!(stats.nodes_by_kind[&NodeCategory::Mem], 2);
        assert_eq!(stats.nodes_by_kind[&NodeCategory::Var], 1);
        assert_eq!(stats.data_edges, 1);
        assert_eq!(stats.control_edges, 1);
        assert_eq!(stats.cross_program_edges, 1);
        assert_eq!(*stats.array_checks.get(ProgramId::First), 3);
        assert_eq!(*stats.array_checks.get(ProgramId::Second), 2);
    }
}
