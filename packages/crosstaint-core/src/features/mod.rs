//! Feature modules
//!
//! Each feature contains:
//! - domain/     - Pure data model and invariants
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Algorithms and stores

pub mod alias_analysis;
pub mod dependency_graph;
pub mod input_classification;
pub mod network_levels;
pub mod reachability;
