//! Path memo for stop-aware DFS
//!
//! Caches `(start, stop) -> Option<path>` answers of
//! [`DependencyGraph::dfs_path_with_stop`](super::graph::DependencyGraph).
//! The memo records the graph generation it was filled against and clears
//! itself the first time it is used with a different one, so it can never
//! serve an answer from a graph that has since been mutated.

use crate::features::dependency_graph::domain::NodeId;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Default)]
pub struct PathMemo {
    generation: Option<u64>,
    entries: FxHashMap<(NodeId, NodeId), Option<Vec<NodeId>>>,
    hits: u64,
    misses: u64,
}

/// Memo counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl PathMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Align with `generation`, dropping everything on mismatch
    pub(crate) fn sync(&mut self, generation: u64) {
        if self.generation != Some(generation) {
            self.entries.clear();
            self.generation = Some(generation);
        }
    }

    pub(crate) fn lookup(&mut self, start: NodeId, stop: NodeId) -> Option<Option<Vec<NodeId>>> {
        match self.entries.get(&(start, stop)) {
            Some(entry) => {
                self.hits += 1;
                Some(entry.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Peek without touching counters; used while expanding a search
    pub(crate) fn peek(&self, start: NodeId, stop: NodeId) -> Option<&Option<Vec<NodeId>>> {
        self.entries.get(&(start, stop))
    }

    pub(crate) fn record(&mut self, start: NodeId, stop: NodeId, path: Option<Vec<NodeId>>) {
        self.entries.insert((start, stop), path);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_stats(&self) -> MemoStats {
        MemoStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
