//! Error types for crosstaint-core
//!
//! Each layer has its own error enum; `CrosstaintError` wraps them for the
//! analysis entry points.

use crate::config::ConfigError;
use crate::features::dependency_graph::GraphError;
use crate::features::reachability::ReachabilityError;
use thiserror::Error;

/// Main error type for crosstaint-core operations
#[derive(Debug, Error)]
pub enum CrosstaintError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Graph error
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Reachability error
    #[error("Reachability error: {0}")]
    Reachability(#[from] ReachabilityError),
}

/// Result type alias for crosstaint operations
pub type Result<T> = std::result::Result<T, CrosstaintError>;
