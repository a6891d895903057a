//! Graph algorithms over the dependency graph
//!
//! - Plain forward/backward reachability (`dfs_forward`, `dfs_backward`)
//! - Intersecting subgraph extraction (`subgraph`)
//! - Stop-aware DFS, as a visited set or as one memoized path
//! - Predecessor BFS: nearest source (`shortest_dependency`) and every
//!   source with its path (`every_dependency`)
//!
//! Neighbours are always visited in ascending handle order, so every
//! traversal is deterministic for a given graph.

use super::graph::DependencyGraph;
use super::memo::PathMemo;
use crate::features::dependency_graph::domain::{GraphResult, NodeId};
use crate::shared::models::ProgramId;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, VecDeque};
use tracing::trace;

/// Result of [`DependencyGraph::subgraph`]
#[derive(Debug, Clone, Default)]
pub struct Subgraph {
    pub graph: DependencyGraph,
    /// New handle -> handle in the source graph
    pub origin: FxHashMap<NodeId, NodeId>,
}

impl Subgraph {
    /// Handle in the extracted graph of a source-graph node
    pub fn local_id(&self, source: NodeId) -> Option<NodeId> {
        self.origin
            .iter()
            .find_map(|(local, orig)| (*orig == source).then_some(*local))
    }
}

/// Result of [`DependencyGraph::every_dependency`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyPaths {
    /// Source -> path from that source to the sink (inclusive)
    pub paths: BTreeMap<NodeId, Vec<NodeId>>,
    /// Some reported dependency entered through this program's NetRead
    pub net_dependency: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl DependencyGraph {
    fn neighbours(&self, id: NodeId, direction: Direction) -> Vec<NodeId> {
        match direction {
            Direction::Forward => self.successors(id).collect(),
            Direction::Backward => self.predecessors(id).collect(),
        }
    }

    fn reach(&self, start: NodeId, direction: Direction) -> FxHashSet<NodeId> {
        let mut visited = FxHashSet::default();
        if !self.is_live(start) {
            return visited;
        }
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(node) = stack.pop() {
            for next in self.neighbours(node, direction).into_iter().rev() {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        visited
    }

    /// Every node reachable from `start` along successors (`start` included)
    pub fn dfs_forward(&self, start: NodeId) -> FxHashSet<NodeId> {
        self.reach(start, Direction::Forward)
    }

    /// Every node that reaches `start` (`start` included)
    pub fn dfs_backward(&self, start: NodeId) -> FxHashSet<NodeId> {
        self.reach(start, Direction::Backward)
    }

    /// Clone of `dfs_forward(src) ∩ dfs_backward(dst)`
    ///
    /// Only edges with both endpoints in the intersection are re-wired.
    pub fn subgraph(&self, src: NodeId, dst: NodeId) -> GraphResult<Subgraph> {
        let backward = self.dfs_backward(dst);
        let mut keep: Vec<NodeId> = self
            .dfs_forward(src)
            .into_iter()
            .filter(|id| backward.contains(id))
            .collect();
        keep.sort_unstable();

        let mut result = Subgraph::default();
        let mut local: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        for id in &keep {
            if let Some(node) = self.node(*id) {
                let new_id = result.graph.insert_detached(node)?;
                local.insert(*id, new_id);
                result.origin.insert(new_id, *id);
            }
        }
        for id in &keep {
            let Some(node) = self.node(*id) else { continue };
            for (succ, kind) in node.successors() {
                if let (Some(&a), Some(&b)) = (local.get(id), local.get(succ)) {
                    result.graph.connect(a, b, *kind);
                }
            }
        }
        trace!(src = %src, dst = %dst, nodes = keep.len(), "subgraph extracted");
        Ok(result)
    }

    /// Forward DFS from `start` that exits as soon as `stop` is visited
    ///
    /// Returns whether `stop` was reached and the set visited so far.
    pub fn dfs_with_stop(&self, start: NodeId, stop: NodeId) -> (bool, FxHashSet<NodeId>) {
        let mut visited = FxHashSet::default();
        if !self.is_live(start) {
            return (false, visited);
        }
        let mut stack = vec![start];
        visited.insert(start);
        while let Some(node) = stack.pop() {
            if node == stop {
                return (true, visited);
            }
            for next in self.neighbours(node, Direction::Forward).into_iter().rev() {
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
        (false, visited)
    }

    /// One forward path `start -> .. -> stop`, memoized per `(node, stop)`
    ///
    /// On success every node of the discovered path gets its suffix recorded;
    /// on failure every visited node is recorded as unable to reach `stop`.
    pub fn dfs_path_with_stop(
        &self,
        memo: &mut PathMemo,
        start: NodeId,
        stop: NodeId,
    ) -> Option<Vec<NodeId>> {
        memo.sync(self.generation());
        if let Some(answer) = memo.lookup(start, stop) {
            return answer;
        }
        if !self.is_live(start) || !self.is_live(stop) {
            return None;
        }
        if start == stop {
            memo.record(start, stop, Some(vec![start]));
            return Some(vec![start]);
        }

        let mut parent: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack = vec![start];
        visited.insert(start);
        let mut found: Option<(NodeId, Vec<NodeId>)> = None;

        while let Some(node) = stack.pop() {
            if node == stop {
                found = Some((node, vec![stop]));
                break;
            }
            if node != start {
                match memo.peek(node, stop) {
                    Some(Some(suffix)) => {
                        found = Some((node, suffix.clone()));
                        break;
                    }
                    Some(None) => continue,
                    None => {}
                }
            }
            for next in self.neighbours(node, Direction::Forward).into_iter().rev() {
                if visited.insert(next) {
                    parent.insert(next, node);
                    stack.push(next);
                }
            }
        }

        let Some((meeting, suffix)) = found else {
            for node in visited {
                memo.record(node, stop, None);
            }
            return None;
        };

        let mut prefix = Vec::new();
        let mut cursor = meeting;
        while cursor != start {
            match parent.get(&cursor) {
                Some(&p) => {
                    prefix.push(p);
                    cursor = p;
                }
                None => break,
            }
        }
        prefix.reverse();

        let mut path = prefix;
        path.extend(suffix);
        for (i, node) in path.iter().enumerate() {
            memo.record(*node, stop, Some(path[i..].to_vec()));
        }
        Some(path)
    }

    /// Nearest member of `sources` upstream of `sink`, with its BFS distance
    ///
    /// With `skip_mem` every Mem node other than the sink is treated as
    /// already visited.
    pub fn shortest_dependency(
        &self,
        sink: NodeId,
        sources: &FxHashSet<NodeId>,
        skip_mem: bool,
    ) -> Option<(NodeId, usize)> {
        if !self.is_live(sink) {
            return None;
        }
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        visited.insert(sink);
        let mut queue = VecDeque::from([(sink, 0usize)]);

        while let Some((node, distance)) = queue.pop_front() {
            if sources.contains(&node) {
                return Some((node, distance));
            }
            for pred in self.predecessors(node) {
                if visited.contains(&pred) {
                    continue;
                }
                visited.insert(pred);
                if skip_mem && self.node(pred).map(|n| n.is_mem()).unwrap_or(false) {
                    continue;
                }
                queue.push_back((pred, distance + 1));
            }
        }
        None
    }

    /// Every member of `sources` upstream of `sink`, each with one path
    ///
    /// Paths run source -> sink. With `skip_net`, this program's NetRead
    /// nodes are barriers: the search does not cross them, but reaching one
    /// sets `net_dependency`. Without `skip_net`, `net_dependency` is set
    /// when a reported path passes through one of them.
    pub fn every_dependency(
        &self,
        sink: NodeId,
        sources: &FxHashSet<NodeId>,
        skip_mem: bool,
        skip_net: bool,
        program: ProgramId,
    ) -> DependencyPaths {
        let mut result = DependencyPaths::default();
        if !self.is_live(sink) {
            return result;
        }

        // child pointer: the neighbour one step closer to the sink
        let mut toward_sink: FxHashMap<NodeId, NodeId> = FxHashMap::default();
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        visited.insert(sink);
        let mut queue = VecDeque::from([sink]);

        while let Some(node) = queue.pop_front() {
            let is_own_net_read = self
                .node(node)
                .map(|n| n.is_net_read_of(program))
                .unwrap_or(false);

            if node != sink && is_own_net_read && skip_net {
                result.net_dependency = true;
                continue;
            }

            if sources.contains(&node) {
                let path = self.path_to_sink(node, sink, &toward_sink);
                if !skip_net
                    && path
                        .iter()
                        .any(|n| self.node(*n).map(|n| n.is_net_read_of(program)).unwrap_or(false))
                {
                    result.net_dependency = true;
                }
                result.paths.insert(node, path);
            }

            for pred in self.predecessors(node) {
                if visited.contains(&pred) {
                    continue;
                }
                visited.insert(pred);
                if skip_mem && self.node(pred).map(|n| n.is_mem()).unwrap_or(false) {
                    continue;
                }
                toward_sink.insert(pred, node);
                queue.push_back(pred);
            }
        }
        result
    }

    fn path_to_sink(
        &self,
        from: NodeId,
        sink: NodeId,
        toward_sink: &FxHashMap<NodeId, NodeId>,
    ) -> Vec<NodeId> {
        let mut path = vec![from];
        let mut cursor = from;
        while cursor != sink {
            match toward_sink.get(&cursor) {
                Some(&next) => {
                    path.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        path
    }
}
