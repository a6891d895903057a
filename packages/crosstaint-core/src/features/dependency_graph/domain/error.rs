//! Graph error types

use super::node::NodeId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Handle of a removed (or never allocated) node
    #[error("stale node handle {0}")]
    StaleNode(NodeId),

    /// Operation expected a call-like node
    #[error("node {0} is not a call site")]
    NotACall(NodeId),

    /// The arena ran out of 32-bit handles
    #[error("node arena is full at {0} slots")]
    CapacityExceeded(usize),
}

pub type GraphResult<T> = Result<T, GraphError>;
