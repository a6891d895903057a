//! Common test utilities for crosstaint-core
//!
//! Two-program fixtures and the helpers that turn them into graphs.

#![allow(dead_code)]

mod builders;
mod fixtures;

pub use builders::*;
pub use fixtures::*;
