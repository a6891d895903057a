//! Per-function level graph
//!
//! Vertices are the function's basic blocks plus its call sites of one
//! network direction. Inside a block the calls form a chain
//! `block -> call1 -> .. -> callN`, and the last link of the chain points at
//! the block's successors.

use crate::config::NamingConvention;
use crate::features::network_levels::domain::LevelVertex;
use crate::shared::models::{FunctionBody, NetDirection};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct LevelGraph {
    pub graph: DiGraph<LevelVertex, ()>,
    /// Vertex of the function's first block
    pub first_block: Option<NodeIndex>,
}

impl LevelGraph {
    pub fn build(function: &FunctionBody, direction: NetDirection, naming: &NamingConvention) -> Self {
        let layout = function.layout();
        let mut graph = DiGraph::new();
        let mut blocks: FxHashMap<u32, NodeIndex> = FxHashMap::default();
        for block in &layout {
            blocks.insert(block.id, graph.add_node(LevelVertex::Block(block.id)));
        }

        for block in &layout {
            let Some(&head) = blocks.get(&block.id) else { continue };
            let mut tail = head;
            let calls = block
                .call_sites
                .iter()
                .filter(|c| naming.net_direction(function.program, &c.callee) == Some(direction));
            for call in calls {
                let vertex = graph.add_node(LevelVertex::Call {
                    callee: call.callee.clone(),
                    location: call.location.clone(),
                });
                graph.update_edge(tail, vertex, ());
                tail = vertex;
            }
            for succ in &block.successors {
                if let Some(&target) = blocks.get(succ) {
                    graph.update_edge(tail, target, ());
                }
            }
        }

        let first_block = layout.first().and_then(|b| blocks.get(&b.id).copied());
        Self { graph, first_block }
    }

    pub fn call_count(&self) -> usize {
        self.graph.node_weights().filter(|v| v.is_call()).count()
    }

    /// Vertices with no predecessor other than themselves; the first block if
    /// every vertex has one
    pub fn entry_vertices(&self) -> Vec<NodeIndex> {
        let entries: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|v| {
                self.graph
                    .neighbors_directed(*v, Direction::Incoming)
                    .all(|p| p == *v)
            })
            .collect();
        if entries.is_empty() {
            return self.first_block.into_iter().collect();
        }
        entries
    }

    pub fn compute_levels(&self) -> Vec<BTreeSet<NodeIndex>> {
        compute_levels(&self.graph, &self.entry_vertices())
    }
}

/// BFS layering from `entries`
///
/// Level 0 is the entry set; level k+1 holds the successors of level k that
/// no earlier level placed. Stops on an empty level or a repeated one.
pub fn compute_levels<N, E>(graph: &DiGraph<N, E>, entries: &[NodeIndex]) -> Vec<BTreeSet<NodeIndex>> {
    let mut levels: Vec<BTreeSet<NodeIndex>> = Vec::new();
    let mut placed: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut current: BTreeSet<NodeIndex> = entries.iter().copied().collect();

    while !current.is_empty() && !levels.contains(&current) {
        placed.extend(current.iter().copied());
        let next: BTreeSet<NodeIndex> = current
            .iter()
            .flat_map(|v| graph.neighbors_directed(*v, Direction::Outgoing))
            .filter(|v| !placed.contains(v))
            .collect();
        levels.push(current);
        current = next;
    }
    levels
}
