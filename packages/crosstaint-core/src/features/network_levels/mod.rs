//! Network Level Correlation
//!
//! Per program and direction, BFS layering of each function's send/recv call
//! sites, with a reverse index from source location to levels. The graph
//! builder links a send to a recv of the other program when their level-sets
//! intersect.

pub mod domain;
pub mod infrastructure;

pub use domain::{levels_correlate, FunctionLevels, LevelVertex, ProgramStructure};
pub use infrastructure::{compute_levels, LevelGraph, NetworkLevelCorrelator};
