//! Alias Analysis
//!
//! Merges the raw points-to sets of an external pointer analysis into the
//! disjoint alias classes that back the graph's Mem nodes.

pub mod domain;
pub mod infrastructure;

pub use domain::{AliasClass, MergeStats};
pub use infrastructure::{AliasPartition, AliasSetMerger};
