/*
 * crosstaint-core - Cross-Program Taint Analysis Engine
 *
 * Feature-First Architecture:
 * - shared/      : Program model (values, operations, functions) and front-end ports
 * - features/    : dependency_graph, alias_analysis, network_levels,
 *                  input_classification, reachability
 * - config/      : Engine configuration (YAML, validation)
 *
 * Two communicating programs are merged into one dependency graph; send/recv
 * call sites are linked across programs by level correlation, and memory
 * accesses reachable from local, network and cross-program inputs are counted.
 */

#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional

/// Shared models and ports
pub mod shared;

/// Feature modules
pub mod features;

/// Engine configuration
pub mod config;

/// Crate error type
pub mod errors;

pub use config::EngineConfig;
pub use errors::{CrosstaintError, Result};
pub use features::reachability::{AnalysisOutcome, AnalysisReport, AnalysisService};
