//! Ports to the external collaborators of the engine
//!
//! The engine never reads a compiler IR itself. Everything it needs comes
//! through two narrow traits:
//! - [`ProgramFrontEnd`]: operation streams and value metadata
//! - [`AliasOracle`]: the alias partition of pointer values

use crate::shared::models::{FunctionBody, Operation, Value, ValueInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Program front end (operations, operands, call targets, source lines)
pub trait ProgramFrontEnd {
    /// Metadata for a value; `None` means the front end cannot classify it
    fn value_info(&self, value: Value) -> Option<&ValueInfo>;

    /// Operation whose result is `value`, if any
    fn defining_operation(&self, value: Value) -> Option<&Operation>;

    /// Every function of both programs, in stream order
    fn functions(&self) -> &[FunctionBody];
}

/// Alias-set key: identifies one alias class of the oracle's partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AliasKey(pub u32);

impl fmt::Display for AliasKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alias#{}", self.0)
    }
}

/// Alias oracle
///
/// Contract: every value reported under a key by `alias_set_key` is listed by
/// `values_in_set` for that key. The graph builder treats a violation as a
/// programmer error.
pub trait AliasOracle {
    /// Alias class of a memory-referencing value
    fn alias_set_key(&self, value: Value) -> Option<AliasKey>;

    /// Members of an alias class; `None` if the class does not exist
    fn values_in_set(&self, key: AliasKey) -> Option<&[Value]>;
}
