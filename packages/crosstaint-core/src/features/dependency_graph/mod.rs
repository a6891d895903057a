//! Dependency Graph
//!
//! Node/edge store of both programs with construction from the front end,
//! incremental cross-program send/recv linking, and reachability queries.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{
    CallSiteInfo, EdgeKind, GraphError, GraphNode, GraphResult, InputOrigin, LevelSet, NodeCategory,
    NodeId, NodeKind,
};
pub use infrastructure::{
    BuildContext, DependencyGraph, DependencyPaths, GraphBuilder, GraphStats, MemoStats, PathMemo,
    Subgraph,
};
pub use ports::{LevelLookup, NoLevels};
