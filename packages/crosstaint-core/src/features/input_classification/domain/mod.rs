//! Input classification domain

pub mod input_sets;
pub mod primitive;

pub use input_sets::{InputRecord, InputScope, InputSets};
pub use primitive::{PrimitiveKind, PrimitiveMatch, TaintedOperands};
