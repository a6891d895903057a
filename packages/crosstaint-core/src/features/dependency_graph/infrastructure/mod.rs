//! Dependency graph infrastructure
//!
//! - `graph`: arena store, edges, lookup caches, removal
//! - `builder`: construction from operation streams, cross-program linking,
//!   input wiring, call splicing
//! - `traversal`: DFS/BFS queries and subgraph extraction
//! - `memo`: generation-checked path memo
//! - `stats`: node/edge statistics

pub mod builder;
pub mod graph;
pub mod memo;
pub mod stats;
pub mod traversal;

pub use builder::{BuildContext, GraphBuilder};
pub use graph::DependencyGraph;
pub use memo::{MemoStats, PathMemo};
pub use stats::GraphStats;
pub use traversal::{DependencyPaths, Subgraph};
