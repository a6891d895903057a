//! Dependency graph nodes
//!
//! Nodes live in an arena owned by the graph and are addressed by
//! [`NodeId`] handles. Adjacency maps store handles, never references, so a
//! removed node simply becomes a stale handle.

use crate::shared::models::{NetDirection, OpcodeClass, ProgramId, SourceLocation, Value};
use crate::shared::ports::AliasKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::edge::EdgeKind;
use super::error::{GraphError, GraphResult};

/// Arena handle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Handle of arena slot `index`; fails once slots no longer fit in `u32`
    pub fn from_index(index: usize) -> GraphResult<Self> {
        u32::try_from(index)
            .map(NodeId)
            .map_err(|_| GraphError::CapacityExceeded(index))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Level-set of a network node (BFS layers, see `network_levels`)
pub type LevelSet = BTreeSet<u32>;

/// Where a classified input comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputOrigin {
    Local,
    Network,
}

/// Call-site payload shared by `Call`, `NetRead` and `NetWrite`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSiteInfo {
    /// Statically known callee
    pub target: Option<String>,
    /// Node of each actual argument, in order (`None`: excluded operand)
    pub args: Vec<Option<NodeId>>,
    /// Value the call defines
    pub result: Option<Value>,
}

/// Node variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Generic operation, optionally defining a value
    Op {
        opcode: OpcodeClass,
        value: Option<Value>,
    },
    /// Call site with no network meaning
    Call(CallSiteInfo),
    /// Scalar/non-pointer value or constant
    Var { value: Value },
    /// One alias class; aggregates every pointer value in it
    Mem { key: AliasKey },
    /// Network receive call site
    NetRead(CallSiteInfo),
    /// Network send call site
    NetWrite(CallSiteInfo),
    /// Taint-source marker for a classified input value
    Input {
        value: Value,
        origin: InputOrigin,
        name: String,
    },
}

/// Variant tag, used for statistics and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeCategory {
    Op,
    Call,
    Var,
    Mem,
    NetRead,
    NetWrite,
    Input,
}

impl NodeCategory {
    pub const ALL: [NodeCategory; 7] = [
        NodeCategory::Op,
        NodeCategory::Call,
        NodeCategory::Var,
        NodeCategory::Mem,
        NodeCategory::NetRead,
        NodeCategory::NetWrite,
        NodeCategory::Input,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::Op => "op",
            NodeCategory::Call => "call",
            NodeCategory::Var => "var",
            NodeCategory::Mem => "mem",
            NodeCategory::NetRead => "net_read",
            NodeCategory::NetWrite => "net_write",
            NodeCategory::Input => "input",
        }
    }
}

impl NodeKind {
    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::Op { .. } => NodeCategory::Op,
            NodeKind::Call(_) => NodeCategory::Call,
            NodeKind::Var { .. } => NodeCategory::Var,
            NodeKind::Mem { .. } => NodeCategory::Mem,
            NodeKind::NetRead(_) => NodeCategory::NetRead,
            NodeKind::NetWrite(_) => NodeCategory::NetWrite,
            NodeKind::Input { .. } => NodeCategory::Input,
        }
    }

    /// Call-site payload of `Call`, `NetRead` and `NetWrite`
    pub fn call_info(&self) -> Option<&CallSiteInfo> {
        match self {
            NodeKind::Call(info) | NodeKind::NetRead(info) | NodeKind::NetWrite(info) => Some(info),
            _ => None,
        }
    }

    pub(crate) fn call_info_mut(&mut self) -> Option<&mut CallSiteInfo> {
        match self {
            NodeKind::Call(info) | NodeKind::NetRead(info) | NodeKind::NetWrite(info) => Some(info),
            _ => None,
        }
    }

    pub fn net_direction(&self) -> Option<NetDirection> {
        match self {
            NodeKind::NetRead(_) => Some(NetDirection::Recv),
            NodeKind::NetWrite(_) => Some(NetDirection::Send),
            _ => None,
        }
    }

    /// Value this node stands for, if it stands for exactly one
    pub fn value(&self) -> Option<Value> {
        match self {
            NodeKind::Op { value, .. } => *value,
            NodeKind::Call(info) | NodeKind::NetRead(info) | NodeKind::NetWrite(info) => info.result,
            NodeKind::Var { value } | NodeKind::Input { value, .. } => Some(*value),
            NodeKind::Mem { .. } => None,
        }
    }
}

/// One node of the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub program: ProgramId,
    pub label: String,
    pub visible: bool,
    /// Number of memory accesses folded into this node (ABC multiplicity)
    pub count: u32,
    pub levels: LevelSet,
    pub location: Option<SourceLocation>,
    pub net_dependent: bool,
    pub kind: NodeKind,
    pub(crate) successors: BTreeMap<NodeId, EdgeKind>,
    pub(crate) predecessors: BTreeMap<NodeId, EdgeKind>,
}

impl GraphNode {
    pub fn new(id: NodeId, program: ProgramId, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id,
            program,
            label: label.into(),
            visible: true,
            count: 0,
            levels: LevelSet::new(),
            location: None,
            net_dependent: false,
            kind,
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn category(&self) -> NodeCategory {
        self.kind.category()
    }

    #[inline]
    pub fn is_mem(&self) -> bool {
        matches!(self.kind, NodeKind::Mem { .. })
    }

    /// `NetRead` belonging to `program`
    #[inline]
    pub fn is_net_read_of(&self, program: ProgramId) -> bool {
        self.program == program && matches!(self.kind, NodeKind::NetRead(_))
    }

    pub fn successors(&self) -> &BTreeMap<NodeId, EdgeKind> {
        &self.successors
    }

    pub fn predecessors(&self) -> &BTreeMap<NodeId, EdgeKind> {
        &self.predecessors
    }

    /// Copy without adjacency, for subgraph extraction
    pub(crate) fn detached(&self, id: NodeId) -> Self {
        Self {
            id,
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
            ..self.clone()
        }
    }
}
