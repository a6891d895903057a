//! Input Classification
//!
//! Classifies values as local or network taint sources, per program, using a
//! closed primitive taxonomy and a pluggable matcher.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{InputRecord, InputScope, InputSets, PrimitiveKind, PrimitiveMatch, TaintedOperands};
pub use infrastructure::{DefaultMatcher, InputClassifier};
pub use ports::PrimitiveMatcher;
