//! Reachability errors

use crate::features::dependency_graph::GraphError;
use crate::shared::models::ProgramId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReachabilityError {
    /// Cross-attributable count exceeded the network count
    #[error("false-positive estimate for {program} would be negative (network {network}, cross {cross})")]
    NegativeFalsePositive { program: ProgramId, network: u64, cross: u64 },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
