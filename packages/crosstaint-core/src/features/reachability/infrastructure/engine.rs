//! Bound-check counting over a built dependency graph
//!
//! A counting pass runs a forward DFS from each source and sums the access
//! multiplicity of every Mem node it reaches. Passes share a [`VisitedSet`],
//! so a node counted by an earlier pass is never counted again.

use crate::config::ReachabilityConfig;
use crate::features::dependency_graph::{DependencyGraph, MemoStats, NodeId, PathMemo};
use crate::features::reachability::domain::{BoundCheckCount, VisitedSet};
use crate::shared::models::ProgramId;
use rustc_hash::FxHashSet;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Nearest source per sink, as returned by [`ReachabilityEngine::shortest_dependencies`]
pub type NearestSource = (NodeId, Option<(NodeId, usize)>);

pub struct ReachabilityEngine<'g> {
    graph: &'g DependencyGraph,
    config: ReachabilityConfig,
    memo: PathMemo,
}

impl<'g> ReachabilityEngine<'g> {
    pub fn new(graph: &'g DependencyGraph, config: &ReachabilityConfig) -> Self {
        Self {
            graph,
            config: config.clone(),
            memo: PathMemo::new(),
        }
    }

    pub fn graph(&self) -> &'g DependencyGraph {
        self.graph
    }

    /// Count the Mem nodes reachable from `sources`
    ///
    /// Sources already in `visited` are skipped. With `cross`, only Mem nodes
    /// that do not belong to `program` count. Every counted node is added to
    /// `visited`.
    pub fn count_reachable_bound_checks(
        &mut self,
        sources: &[NodeId],
        cross: bool,
        program: ProgramId,
        visited: &mut VisitedSet,
    ) -> BoundCheckCount {
        let graph = self.graph;
        let mut result = BoundCheckCount::default();

        for &source in sources {
            if !graph.is_live(source) || !visited.insert(source) {
                continue;
            }

            let mut reach: Vec<NodeId> = graph.dfs_forward(source).into_iter().collect();
            reach.sort_unstable();

            for id in reach {
                let Some(node) = graph.node(id) else { continue };
                if !node.is_mem() || (cross && node.program == program) {
                    continue;
                }
                if !visited.insert(id) {
                    continue;
                }
                result.count += u64::from(node.count);
                result.counted.insert(id);

                if node.count > 0 && self.config.retain_paths && result.paths.len() < self.config.max_paths {
                    if let Some(path) = graph.dfs_path_with_stop(&mut self.memo, source, id) {
                        result.paths.push(path);
                    }
                }
            }
        }

        debug!(
            %program,
            cross,
            sources = sources.len(),
            counted = result.counted.len(),
            count = result.count,
            "bound checks counted"
        );
        result
    }

    /// `shortest_dependency` for every sink against one source set
    ///
    /// Queries are read-only and independent; with the `parallel` feature
    /// they run on the rayon pool. Output order follows `sinks`.
    pub fn shortest_dependencies(
        &self,
        sinks: &[NodeId],
        sources: &FxHashSet<NodeId>,
        skip_mem: bool,
    ) -> Vec<NearestSource> {
        let graph = self.graph;

        #[cfg(feature = "parallel")]
        let nearest = sinks
            .par_iter()
            .map(|&sink| (sink, graph.shortest_dependency(sink, sources, skip_mem)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let nearest = sinks
            .iter()
            .map(|&sink| (sink, graph.shortest_dependency(sink, sources, skip_mem)))
            .collect();

        nearest
    }

    /// Labels of the nodes of `path`, stale handles skipped
    pub fn labels(&self, path: &[NodeId]) -> Vec<String> {
        path.iter()
            .filter_map(|id| self.graph.node(*id))
            .map(|node| node.label.clone())
            .collect()
    }

    /// Sum of the access counts of `nodes`
    pub fn total_count<'a>(&self, nodes: impl IntoIterator<Item = &'a NodeId>) -> u64 {
        nodes
            .into_iter()
            .filter_map(|id| self.graph.node(*id))
            .map(|node| u64::from(node.count))
            .sum()
    }

    pub fn memo_stats(&self) -> MemoStats {
        self.memo.get_stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::dependency_graph::{EdgeKind, InputOrigin, NodeKind};
    use crate::shared::models::Value;
    use crate::shared::ports::AliasKey;

    struct Chain {
        graph: DependencyGraph,
        local: NodeId,
        network: NodeId,
        own_mem: NodeId,
        other_mem: NodeId,
    }

    /// local -> own_mem(count 2); network -> own_mem, network -> other_mem(count 3)
    fn chain() -> Chain {
        let p1 = ProgramId::First;
        let mut graph = DependencyGraph::new();
        let local = graph.input_node(Value::new(p1, 1), InputOrigin::Local, "fgets").unwrap();
        let network = graph.input_node(Value::new(p1, 2), InputOrigin::Network, "recv").unwrap();
        let var = graph.add_node(p1, NodeKind::Var { value: Value::new(p1, 3) }, "v").unwrap();
        let own_mem = graph.mem_node(p1, AliasKey(0), "mem:buf").unwrap();
        let other_mem = graph.mem_node(ProgramId::Second, AliasKey(0), "mem:peer").unwrap();
        graph.node_mut(own_mem).unwrap().count = 2;
        graph.node_mut(other_mem).unwrap().count = 3;

        graph.connect(local, var, EdgeKind::Data);
        graph.connect(var, own_mem, EdgeKind::Data);
        graph.connect(network, own_mem, EdgeKind::Data);
        graph.connect(network, other_mem, EdgeKind::Data);
        Chain {
            graph,
            local,
            network,
            own_mem,
            other_mem,
        }
    }

    #[test]
    fn test_counts_reachable_mem_multiplicity() {
        let c = chain();
        let mut engine = ReachabilityEngine::new(&c.graph, &ReachabilityConfig::default());
        let mut visited = VisitedSet::new();
        let result = engine.count_reachable_bound_checks(&[c.network], false, ProgramId::First, &mut visited);
        assert_eq!(result.count, 5);
        assert_eq!(result.counted.len(), 2);
        assert_eq!(result.paths.len(), 2);
        assert!(result.paths.iter().all(|p| p.first() == Some(&c.network)));
    }

    #[test]
    fn test_shared_visited_set_makes_passes_exclusive() {
        let c = chain();
        let mut engine = ReachabilityEngine::new(&c.graph, &ReachabilityConfig::default());
        let mut visited = VisitedSet::new();
        let local = engine.count_reachable_bound_checks(&[c.local], false, ProgramId::First, &mut visited);
        let network = engine.count_reachable_bound_checks(&[c.network], false, ProgramId::First, &mut visited);
        assert_eq!(local.count, 2);
        assert_eq!(network.count, 3);
        assert!(network.counted.contains(&c.other_mem));
        assert!(!network.counted.contains(&c.own_mem));
    }

    #[test]
    fn test_visited_source_is_skipped() {
        let c = chain();
        let mut engine = ReachabilityEngine::new(&c.graph, &ReachabilityConfig::default());
        let mut visited = VisitedSet::new();
        visited.insert(c.network);
        let result = engine.count_reachable_bound_checks(&[c.network], false, ProgramId::First, &mut visited);
        assert!(result.is_empty());
        assert_eq!(result.count, 0);
    }

    #[test]
    fn test_cross_counts_only_other_program() {
        let c = chain();
        let mut engine = ReachabilityEngine::new(&c.graph, &ReachabilityConfig::default());
        let cross = engine.count_reachable_bound_checks(&[c.network], true, ProgramId::First, &mut VisitedSet::new());
        let plain = engine.count_reachable_bound_checks(&[c.network], false, ProgramId::First, &mut VisitedSet::new());
        assert_eq!(cross.count, 3);
        assert!(cross.count <= plain.count);
    }

    #[test]
    fn test_path_retention_limits() {
        let c = chain();
        let config = ReachabilityConfig {
            retain_paths: true,
            max_paths: 1,
        };
        let mut engine = ReachabilityEngine::new(&c.graph, &config);
        let result = engine.count_reachable_bound_checks(&[c.network], false, ProgramId::First, &mut VisitedSet::new());
        assert_eq!(result.paths.len(), 1);

        let config = ReachabilityConfig {
            retain_paths: false,
            ..ReachabilityConfig::default()
        };
        let mut engine = ReachabilityEngine::new(&c.graph, &config);
        let result = engine.count_reachable_bound_checks(&[c.network], false, ProgramId::First, &mut VisitedSet::new());
        assert!(result.paths.is_empty());
        assert_eq!(result.count, 5);
    }

    #[test]
    fn test_shortest_dependencies_per_sink() {
        let c = chain();
        let engine = ReachabilityEngine::new(&c.graph, &ReachabilityConfig::default());
        let sources: FxHashSet<NodeId> = [c.local].into_iter().collect();
        let nearest = engine.shortest_dependencies(&[c.own_mem, c.other_mem], &sources, false);
        assert_eq!(nearest[0], (c.own_mem, Some((c.local, 2))));
        assert_eq!(nearest[1], (c.other_mem, None));
    }

    #[test]
    fn test_labels_and_totals() {
        let c = chain();
        let engine = ReachabilityEngine::new(&c.graph, &ReachabilityConfig::default());
        assert_eq!(engine.labels(&[c.network, c.other_mem]), vec!["input:net:recv", "mem:peer"]);
        assert_eq!(engine.total_count(&[c.own_mem, c.other_mem]), 5);
    }
}
