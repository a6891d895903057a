//! Dependency Graph Domain
//!
//! Node and edge model: arena handles, node variants, edge types.

pub mod edge;
pub mod error;
pub mod node;

pub use edge::EdgeKind;
pub use error::{GraphError, GraphResult};
pub use node::{CallSiteInfo, GraphNode, InputOrigin, LevelSet, NodeCategory, NodeId, NodeKind};
