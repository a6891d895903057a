//! Shared module - Common types and ports
//!
//! Types used by every feature: program/value identities, the operation
//! stream model and the traits of the external collaborators.

pub mod models;
pub mod ports;

// Re-exports for convenience
pub use models::*;
pub use ports::{AliasKey, AliasOracle, ProgramFrontEnd};
