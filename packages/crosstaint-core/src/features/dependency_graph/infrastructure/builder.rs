//! Graph construction from the front end's operation streams
//!
//! [`GraphBuilder`] is the construction-phase handle of a
//! [`DependencyGraph`]. It materializes one node per operation and,
//! depth-first, one per operand:
//!
//! - pointer values with an alias class collapse onto the class's Mem node
//! - other values get a Var node, or the node of their defining operation
//! - a store returns its destination, wired `value -> destination`
//! - send/recv calls become NetWrite/NetRead nodes and are linked right away
//!   to every known opposite-direction node of the other program whose
//!   level-set intersects theirs
//!
//! Construction is order-dependent (cross-program links only reach nodes that
//! already exist), so it is single-threaded by construction: the builder
//! holds the only `&mut` to the graph.

use super::graph::DependencyGraph;
use crate::config::{GraphConfig, NamingConvention};
use crate::features::dependency_graph::domain::{
    CallSiteInfo, EdgeKind, GraphError, GraphResult, InputOrigin, LevelSet, NodeId, NodeKind,
};
use crate::features::dependency_graph::ports::LevelLookup;
use crate::features::input_classification::domain::InputSets;
use crate::features::network_levels::domain::levels_correlate;
use crate::shared::models::{
    FunctionBody, NetDirection, OpcodeClass, Operation, OperationId, ProgramId, SourceLocation, Value,
};
use crate::shared::ports::{AliasKey, AliasOracle, ProgramFrontEnd};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Collaborators the builder consults
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub front_end: &'a dyn ProgramFrontEnd,
    pub oracle: &'a dyn AliasOracle,
    pub naming: &'a NamingConvention,
    pub config: &'a GraphConfig,
    pub levels: &'a dyn LevelLookup,
}

pub struct GraphBuilder<'g, 'a> {
    graph: &'g mut DependencyGraph,
    ctx: BuildContext<'a>,
    /// Registered operations already visited
    visited_ops: FxHashMap<OperationId, Option<NodeId>>,
}

impl<'g, 'a> GraphBuilder<'g, 'a> {
    pub fn new(graph: &'g mut DependencyGraph, ctx: BuildContext<'a>) -> Self {
        Self {
            graph,
            ctx,
            visited_ops: FxHashMap::default(),
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        self.graph
    }

    /// Stream every function of both programs, in front-end order
    ///
    /// Returns the number of operations that produced a node.
    pub fn build_all(&mut self) -> GraphResult<usize> {
        let front_end = self.ctx.front_end;
        let mut materialized = 0;
        for function in front_end.functions() {
            materialized += self.add_function(function)?;
        }
        debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "dependency graph built"
        );
        Ok(materialized)
    }

    pub fn add_function(&mut self, function: &FunctionBody) -> GraphResult<usize> {
        let mut materialized = 0;
        for op in &function.operations {
            if self.add_operation(op, function.program)?.is_some() {
                materialized += 1;
            }
        }
        Ok(materialized)
    }

    /// Materialize `op` and, recursively, its operands
    ///
    /// Idempotent: revisiting a registered operation, or an operation whose
    /// result already has a node, returns the existing node. Control-flow
    /// terminators yield `None` unless `include_control_flow` is set.
    pub fn add_operation(&mut self, op: &Operation, program: ProgramId) -> GraphResult<Option<NodeId>> {
        if let Some(cached) = op.id.and_then(|id| self.visited_ops.get(&id)) {
            return Ok(*cached);
        }
        if let Some(result) = op.result {
            if let Some(id) = self.graph.find_node(result, program) {
                self.remember(op, Some(id));
                return Ok(Some(id));
            }
        }
        if op.opcode.is_terminator() && !self.ctx.config.include_control_flow {
            self.remember(op, None);
            return Ok(None);
        }

        match op.opcode {
            OpcodeClass::Store => self.add_store(op, program),
            OpcodeClass::Call => self.add_call(op, program).map(Some),
            _ => self.add_generic(op, program).map(Some),
        }
    }

    /// Node for `value`, materializing it on first use
    ///
    /// Yields `None` for values of another program and for values with
    /// neither a node, a defining operation nor metadata.
    pub fn value_node(&mut self, value: Value, program: ProgramId) -> GraphResult<Option<NodeId>> {
        if value.program != program {
            warn!(%value, %program, "operand from the other program excluded");
            return Ok(None);
        }
        if let Some(id) = self.graph.find_node(value, program) {
            return Ok(Some(id));
        }
        if let Some(key) = self.alias_key(value) {
            return self.mem_node_for(value, key, program).map(Some);
        }

        let front_end = self.ctx.front_end;
        if let Some(def) = front_end.defining_operation(value) {
            let node = self.add_operation(def, program)?;
            return Ok(self.graph.find_node(value, program).or(node));
        }

        match front_end.value_info(value) {
            Some(info) => {
                let label = info.name.clone();
                let id = self.graph.add_node(program, NodeKind::Var { value }, label)?;
                self.graph.bind_value(value, id);
                Ok(Some(id))
            }
            None => {
                warn!(%value, "operand has no node and no type; excluded");
                Ok(None)
            }
        }
    }

    /// Value-level `connect`: materializes missing endpoints first
    pub fn connect_values(&mut self, program: ProgramId, src: Value, dst: Value, kind: EdgeKind) -> GraphResult<bool> {
        let src = self.value_node(src, program)?;
        let dst = self.value_node(dst, program)?;
        Ok(match (src, dst) {
            (Some(a), Some(b)) => self.graph.connect(a, b, kind),
            _ => false,
        })
    }

    /// One Input node per classified record, wired into the record value's node
    ///
    /// Returns the number of Input nodes created.
    pub fn add_inputs(&mut self, inputs: &InputSets) -> GraphResult<usize> {
        let mut created = 0;
        for record in inputs.iter() {
            let origin = if record.is_network {
                InputOrigin::Network
            } else {
                InputOrigin::Local
            };
            let Some(target) = self.value_node(record.value, record.program)? else {
                warn!(value = %record.value, name = %record.instruction_name, "input value has no node");
                continue;
            };
            if self.graph.find_input(record.value, origin).is_none() {
                created += 1;
            }
            let input = self.graph.input_node(record.value, origin, &record.instruction_name)?;
            self.graph.connect(input, target, EdgeKind::Data);
        }
        Ok(created)
    }

    /// Replace a call node by parameter/return matching against `callee`
    ///
    /// Actual arguments flow into the callee's formals, the callee's returned
    /// values flow into every former successor of the call, then the call node
    /// is removed.
    pub fn splice_call(&mut self, call: NodeId, callee: &FunctionBody) -> GraphResult<()> {
        let node = self.graph.try_node(call)?;
        let info = match &node.kind {
            NodeKind::Call(info) => info.clone(),
            _ => return Err(GraphError::NotACall(call)),
        };
        let successors: Vec<NodeId> = self.graph.successors(call).collect();

        for (actual, formal) in info.args.iter().zip(&callee.params) {
            let Some(actual) = actual else { continue };
            if let Some(formal_node) = self.value_node(*formal, callee.program)? {
                self.graph.connect(*actual, formal_node, EdgeKind::Data);
            }
        }
        for returned in callee.returned_values() {
            if let Some(ret_node) = self.value_node(returned, callee.program)? {
                for succ in &successors {
                    self.graph.connect(ret_node, *succ, EdgeKind::Data);
                }
            }
        }

        self.graph.remove_node(call)?;
        for entry in self.visited_ops.values_mut() {
            if *entry == Some(call) {
                *entry = None;
            }
        }
        debug!(%call, callee = %callee.name, "call spliced");
        Ok(())
    }

    /// Splice every Call node whose target is a function of the same program
    pub fn splice_known_calls(&mut self) -> GraphResult<usize> {
        let front_end = self.ctx.front_end;
        let mut targets: Vec<(NodeId, &FunctionBody)> = Vec::new();
        for node in self.graph.nodes() {
            let NodeKind::Call(CallSiteInfo {
                target: Some(target),
                ..
            }) = &node.kind
            else {
                continue;
            };
            if let Some(callee) = front_end
                .functions()
                .iter()
                .find(|f| f.program == node.program && f.name == *target)
            {
                targets.push((node.id, callee));
            }
        }

        let spliced = targets.len();
        for (call, callee) in targets {
            self.splice_call(call, callee)?;
        }
        Ok(spliced)
    }

    fn remember(&mut self, op: &Operation, node: Option<NodeId>) {
        if let Some(id) = op.id {
            self.visited_ops.insert(id, node);
        }
    }

    fn alias_key(&self, value: Value) -> Option<AliasKey> {
        let info = self.ctx.front_end.value_info(value)?;
        if !info.is_pointer || info.kind.is_constant() {
            return None;
        }
        self.ctx.oracle.alias_set_key(value)
    }

    fn mem_node_for(&mut self, value: Value, key: AliasKey, program: ProgramId) -> GraphResult<NodeId> {
        let consistent = self
            .ctx
            .oracle
            .values_in_set(key)
            .map(|members| members.contains(&value))
            .unwrap_or(false);
        assert!(
            consistent,
            "alias oracle placed {} in {} but that set does not list it",
            value, key
        );

        let label = self
            .ctx
            .front_end
            .value_info(value)
            .map(|info| format!("mem:{}", info.storage_name()))
            .unwrap_or_else(|| format!("mem:{}", key));
        let id = self.graph.mem_node(program, key, label)?;
        self.graph.bind_mem_value(value, id);
        Ok(id)
    }

    fn op_label(&self, op: &Operation) -> String {
        let name = op
            .result
            .and_then(|r| self.ctx.front_end.value_info(r))
            .map(|info| info.name.clone());
        match (op.callee_name(), name) {
            (Some(callee), _) => callee.to_string(),
            (None, Some(name)) => format!("{}:{}", op.opcode.as_str(), name),
            (None, None) => op.opcode.as_str().to_string(),
        }
    }

    fn set_location(&mut self, id: NodeId, location: Option<&SourceLocation>) {
        if let (Some(node), Some(location)) = (self.graph.node_mut(id), location) {
            if node.location.is_none() {
                node.location = Some(location.clone());
            }
        }
    }

    fn is_mem(&self, id: NodeId) -> bool {
        self.graph.node(id).map(|n| n.is_mem()).unwrap_or(false)
    }

    fn add_store(&mut self, op: &Operation, program: ProgramId) -> GraphResult<Option<NodeId>> {
        let (Some(&value), Some(&destination)) = (op.operands.first(), op.operands.get(1)) else {
            warn!(operands = op.operands.len(), "store without value and destination");
            self.remember(op, None);
            return Ok(None);
        };
        let Some(dst) = self.value_node(destination, program)? else {
            self.remember(op, None);
            return Ok(None);
        };
        self.remember(op, Some(dst));
        self.graph.record_access(dst);
        self.set_location(dst, op.location.as_ref());

        if let Some(src) = self.value_node(value, program)? {
            self.graph.connect(src, dst, EdgeKind::Data);
        }
        Ok(Some(dst))
    }

    fn add_generic(&mut self, op: &Operation, program: ProgramId) -> GraphResult<NodeId> {
        let pointer_result = op
            .result
            .and_then(|r| self.alias_key(r).map(|alias| (r, alias)));
        let node = match pointer_result {
            Some((result, alias)) => self.mem_node_for(result, alias, program)?,
            None => {
                let label = self.op_label(op);
                let kind = NodeKind::Op {
                    opcode: op.opcode,
                    value: op.result,
                };
                let id = self.graph.add_node(program, kind, label)?;
                if let Some(result) = op.result {
                    self.graph.bind_value(result, id);
                }
                id
            }
        };
        self.remember(op, Some(node));
        self.set_location(node, op.location.as_ref());

        for (i, operand) in op.operands.iter().enumerate() {
            let Some(src) = self.value_node(*operand, program)? else { continue };
            if i == 0 && op.opcode == OpcodeClass::Load && self.is_mem(src) {
                self.graph.record_access(src);
            }
            self.graph.connect(src, node, EdgeKind::Data);
        }
        Ok(node)
    }

    fn add_call(&mut self, op: &Operation, program: ProgramId) -> GraphResult<NodeId> {
        let callee = op.callee_name();
        let direction = callee.and_then(|c| self.ctx.naming.net_direction(program, c));
        let info = CallSiteInfo {
            target: callee.map(str::to_string),
            args: Vec::with_capacity(op.operands.len()),
            result: op.result,
        };
        let kind = match direction {
            Some(NetDirection::Send) => NodeKind::NetWrite(info),
            Some(NetDirection::Recv) => NodeKind::NetRead(info),
            None => NodeKind::Call(info),
        };
        let label = self.op_label(op);
        let id = self.graph.add_node(program, kind, label)?;
        self.set_location(id, op.location.as_ref());

        let pointer_result = op
            .result
            .and_then(|r| self.alias_key(r).map(|alias| (r, alias)));
        if let (Some(result), None) = (op.result, pointer_result) {
            self.graph.bind_value(result, id);
        }
        self.remember(op, Some(id));

        if let Some(direction) = direction {
            self.correlate(id, program, direction, op.location.as_ref());
        }

        let mut args = Vec::with_capacity(op.operands.len());
        for operand in &op.operands {
            let arg = self.value_node(*operand, program)?;
            if let Some(arg_node) = arg {
                if direction == Some(NetDirection::Recv) && self.is_mem(arg_node) {
                    // received bytes land in the buffer
                    self.graph.connect(id, arg_node, EdgeKind::Data);
                    self.graph.record_access(arg_node);
                    if let Some(node) = self.graph.node_mut(arg_node) {
                        node.net_dependent = true;
                    }
                } else {
                    self.graph.connect(arg_node, id, EdgeKind::Data);
                }
            }
            args.push(arg);
        }
        if let Some(node) = self.graph.node_mut(id) {
            if let Some(info) = node.kind.call_info_mut() {
                info.args = args;
            }
            if direction == Some(NetDirection::Recv) {
                node.net_dependent = true;
            }
        }

        if let Some((result, alias)) = pointer_result {
            let mem = self.mem_node_for(result, alias, program)?;
            self.graph.connect(id, mem, EdgeKind::Data);
        }
        Ok(id)
    }

    /// Attach levels to a fresh network node and link it to every known
    /// opposite-direction node of the other program with intersecting levels
    fn correlate(
        &mut self,
        id: NodeId,
        program: ProgramId,
        direction: NetDirection,
        location: Option<&SourceLocation>,
    ) {
        let levels: LevelSet = location
            .map(|loc| self.ctx.levels.node_levels(program, direction, loc))
            .unwrap_or_default();
        if levels.is_empty() {
            debug!(node = %id, "network node without levels is never cross-linked");
            return;
        }
        if let Some(node) = self.graph.node_mut(id) {
            node.levels = levels.clone();
        }

        let peers: Vec<NodeId> = self
            .graph
            .net_nodes(program.other(), direction.opposite())
            .to_vec();
        for peer in peers {
            let Some(peer_levels) = self.graph.node(peer).map(|p| &p.levels) else { continue };
            let (src, dst) = match direction {
                NetDirection::Send => (id, peer),
                NetDirection::Recv => (peer, id),
            };
            let linked = match direction {
                NetDirection::Send => levels_correlate(&levels, peer_levels),
                NetDirection::Recv => levels_correlate(peer_levels, &levels),
            };
            if linked && self.graph.connect(src, dst, EdgeKind::Data) {
                debug!(%src, %dst, "cross-program edge");
            }
        }
    }
}
