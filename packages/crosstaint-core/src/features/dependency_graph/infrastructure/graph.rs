//! Arena-backed dependency graph store
//!
//! Nodes are owned by a `Vec<Option<GraphNode>>` arena; edges are kept as
//! ordered successor/predecessor maps on both endpoints. Lookup caches map
//! values, alias classes, network call sites and inputs to their nodes.
//!
//! Every mutation that can change reachability bumps `generation`, which
//! invalidates [`PathMemo`](super::memo::PathMemo) contents.

use crate::features::dependency_graph::domain::{
    EdgeKind, GraphError, GraphNode, GraphResult, InputOrigin, NodeId, NodeKind,
};
use crate::shared::models::{NetDirection, ProgramId, Value};
use crate::shared::ports::AliasKey;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Option<GraphNode>>,
    /// Var/Op/Call nodes by defined value
    value_nodes: FxHashMap<Value, NodeId>,
    /// Mem nodes by alias class
    mem_nodes: FxHashMap<(ProgramId, AliasKey), NodeId>,
    /// Pointer values already folded into a Mem node
    mem_values: FxHashMap<Value, NodeId>,
    net_nodes: FxHashMap<(ProgramId, NetDirection), Vec<NodeId>>,
    input_nodes: FxHashMap<(Value, InputOrigin), NodeId>,
    live: usize,
    edges: usize,
    generation: u64,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutation counter; changes whenever reachability may have changed
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live nodes
    #[inline]
    pub fn node_count(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn try_node(&self, id: NodeId) -> GraphResult<&GraphNode> {
        self.node(id).ok_or(GraphError::StaleNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Live nodes in id order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Append a node; network nodes are registered in the per-direction lists
    pub fn add_node(&mut self, program: ProgramId, kind: NodeKind, label: impl Into<String>) -> GraphResult<NodeId> {
        let id = NodeId::from_index(self.nodes.len())?;
        if let Some(direction) = kind.net_direction() {
            self.net_nodes.entry((program, direction)).or_default().push(id);
        }
        let node = GraphNode::new(id, program, kind, label);
        trace!(node = %id, label = %node.label, "add node");
        self.nodes.push(Some(node));
        self.live += 1;
        Ok(id)
    }

    /// Mem node of an alias class, created on first use
    pub fn mem_node(&mut self, program: ProgramId, key: AliasKey, label: impl Into<String>) -> GraphResult<NodeId> {
        if let Some(&id) = self.mem_nodes.get(&(program, key)) {
            return Ok(id);
        }
        let id = self.add_node(program, NodeKind::Mem { key }, label)?;
        self.mem_nodes.insert((program, key), id);
        Ok(id)
    }

    /// Count one more memory access folded into `id`
    pub fn record_access(&mut self, id: NodeId) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.count += 1;
                true
            }
            None => false,
        }
    }

    /// Input marker for `value`, created on first use
    pub fn input_node(&mut self, value: Value, origin: InputOrigin, name: &str) -> GraphResult<NodeId> {
        if let Some(&id) = self.input_nodes.get(&(value, origin)) {
            return Ok(id);
        }
        let label = format!("input:{}:{}", origin_label(origin), name);
        let kind = NodeKind::Input {
            value,
            origin,
            name: name.to_string(),
        };
        let id = self.add_node(value.program, kind, label)?;
        self.input_nodes.insert((value, origin), id);
        Ok(id)
    }

    pub(crate) fn bind_value(&mut self, value: Value, id: NodeId) {
        self.value_nodes.insert(value, id);
    }

    pub(crate) fn bind_mem_value(&mut self, value: Value, id: NodeId) {
        self.mem_values.insert(value, id);
    }

    /// Node standing for `value` within `program`
    ///
    /// Pointer values resolve to their Mem node, everything else (constants
    /// included) to its own Var/Op node.
    pub fn find_node(&self, value: Value, program: ProgramId) -> Option<NodeId> {
        if value.program != program {
            return None;
        }
        self.mem_values
            .get(&value)
            .or_else(|| self.value_nodes.get(&value))
            .copied()
    }

    pub fn find_mem(&self, program: ProgramId, key: AliasKey) -> Option<NodeId> {
        self.mem_nodes.get(&(program, key)).copied()
    }

    pub fn find_input(&self, value: Value, origin: InputOrigin) -> Option<NodeId> {
        self.input_nodes.get(&(value, origin)).copied()
    }

    /// Known network call sites of one program and direction, in insertion order
    pub fn net_nodes(&self, program: ProgramId, direction: NetDirection) -> &[NodeId] {
        self.net_nodes
            .get(&(program, direction))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Add `src -> dst`
    ///
    /// Returns `true` only when a new edge was inserted. Self-loops and stale
    /// endpoints are ignored. Re-adding an existing edge is a no-op, except that
    /// a `Control` edge is upgraded to `Data`.
    pub fn connect(&mut self, src: NodeId, dst: NodeId, kind: EdgeKind) -> bool {
        if src == dst {
            return false;
        }
        if !self.is_live(src) || !self.is_live(dst) {
            debug!(%src, %dst, "connect on stale handle ignored");
            return false;
        }

        let existing = self.node(src).and_then(|n| n.successors.get(&dst).copied());
        match existing {
            Some(EdgeKind::Control) if kind == EdgeKind::Data => {
                self.set_edge(src, dst, EdgeKind::Data);
                false
            }
            Some(_) => false,
            None => {
                self.set_edge(src, dst, kind);
                self.edges += 1;
                self.generation += 1;
                true
            }
        }
    }

    fn set_edge(&mut self, src: NodeId, dst: NodeId, kind: EdgeKind) {
        if let Some(node) = self.node_mut(src) {
            node.successors.insert(dst, kind);
        }
        if let Some(node) = self.node_mut(dst) {
            node.predecessors.insert(src, kind);
        }
    }

    pub fn has_edge(&self, src: NodeId, dst: NodeId) -> bool {
        self.node(src)
            .map(|n| n.successors.contains_key(&dst))
            .unwrap_or(false)
    }

    pub fn edge_kind(&self, src: NodeId, dst: NodeId) -> Option<EdgeKind> {
        self.node(src).and_then(|n| n.successors.get(&dst).copied())
    }

    /// Successor handles in id order (empty for stale handles)
    pub fn successors(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.successors.keys().copied())
    }

    /// Predecessor handles in id order (empty for stale handles)
    pub fn predecessors(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.predecessors.keys().copied())
    }

    /// Remove a node and every edge touching it
    ///
    /// All cache entries pointing at the node are dropped; the handle becomes
    /// stale and is never reused.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<GraphNode> {
        let node = self
            .nodes
            .get_mut(id.index())
            .and_then(Option::take)
            .ok_or(GraphError::StaleNode(id))?;

        for succ in node.successors.keys() {
            if let Some(n) = self.node_mut(*succ) {
                n.predecessors.remove(&id);
            }
        }
        for pred in node.predecessors.keys() {
            if let Some(n) = self.node_mut(*pred) {
                n.successors.remove(&id);
            }
        }
        self.edges -= node.successors.len() + node.predecessors.len();

        self.value_nodes.retain(|_, n| *n != id);
        self.mem_values.retain(|_, n| *n != id);
        self.mem_nodes.retain(|_, n| *n != id);
        self.input_nodes.retain(|_, n| *n != id);
        for list in self.net_nodes.values_mut() {
            list.retain(|n| *n != id);
        }

        self.live -= 1;
        self.generation += 1;
        debug!(node = %id, label = %node.label, "removed node");
        Ok(node)
    }

    /// Every live Mem node of `program`
    pub fn mem_nodes_of(&self, program: ProgramId) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes()
            .filter(move |n| n.program == program && n.is_mem())
    }

    /// Rebuild lookup caches for a node copied into this graph
    pub(crate) fn insert_detached(&mut self, node: &GraphNode) -> GraphResult<NodeId> {
        let id = NodeId::from_index(self.nodes.len())?;
        let copy = node.detached(id);
        match &copy.kind {
            NodeKind::Mem { key } => {
                self.mem_nodes.insert((copy.program, *key), id);
            }
            NodeKind::Input { value, origin, .. } => {
                self.input_nodes.insert((*value, *origin), id);
            }
            kind => {
                if let Some(direction) = kind.net_direction() {
                    self.net_nodes.entry((copy.program, direction)).or_default().push(id);
                }
                if let Some(value) = kind.value() {
                    self.value_nodes.insert(value, id);
                }
            }
        }
        self.nodes.push(Some(copy));
        self.live += 1;
        Ok(id)
    }
}

fn origin_label(origin: InputOrigin) -> &'static str {
    match origin {
        InputOrigin::Local => "local",
        InputOrigin::Network => "net",
    }
}
