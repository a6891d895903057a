//! Opaque program values
//!
//! A [`Value`] is a stable identity handed out by the program front end: one
//! storage location or SSA-like definition inside one of the two programs.
//! The engine never looks inside a value, it only asks the front end for the
//! small amount of metadata in [`ValueInfo`].

use super::program::ProgramId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Front-end assigned value number, unique within one program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId(pub u32);

/// Value identity: program membership plus the front-end number
///
/// Values of different programs never compare equal, even with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Value {
    pub program: ProgramId,
    pub id: ValueId,
}

impl Value {
    #[inline]
    pub fn new(program: ProgramId, id: u32) -> Self {
        Self {
            program,
            id: ValueId(id),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:%{}", self.program, self.id.0)
    }
}

/// What kind of definition a value is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Result of an operation
    Instruction,
    /// Formal parameter of a function
    Argument,
    /// Global variable
    Global,
    /// Literal constant
    Constant,
    /// Constant expression (e.g. a constant address computation over a global)
    ConstantExpr,
    /// Function symbol
    Function,
}

impl ValueKind {
    /// Constants are never folded into memory nodes
    #[inline]
    pub fn is_constant(self) -> bool {
        matches!(
            self,
            ValueKind::Constant | ValueKind::ConstantExpr | ValueKind::Function
        )
    }
}

/// Metadata the front end supplies for one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueInfo {
    pub name: String,
    pub kind: ValueKind,
    pub is_pointer: bool,
    /// Named buffer a constant expression resolves to, if any
    pub resolves_to: Option<String>,
}

impl ValueInfo {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_pointer: false,
            resolves_to: None,
        }
    }

    pub fn pointer(mut self) -> Self {
        self.is_pointer = true;
        self
    }

    pub fn resolving_to(mut self, buffer: impl Into<String>) -> Self {
        self.resolves_to = Some(buffer.into());
        self
    }

    /// Name of the storage this value denotes, looking through constant
    /// expressions
    pub fn storage_name(&self) -> &str {
        self.resolves_to.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_differ_across_programs() {
        let a = Value::new(ProgramId::First, 7);
        let b = Value::new(ProgramId::Second, 7);
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "P1:%7");
    }

    #[test]
    fn test_constant_kinds() {
        assert!(ValueKind::Constant.is_constant());
        assert!(ValueKind::ConstantExpr.is_constant());
        assert!(!ValueKind::Global.is_constant());
        assert!(!ValueKind::Instruction.is_constant());
    }

    #[test]
    fn test_storage_name_looks_through_constant_expr() {
        let info = ValueInfo::new("gep.1", ValueKind::ConstantExpr)
            .pointer()
            .resolving_to("msg_buf");
        assert_eq!(info.storage_name(), "msg_buf");
        assert_eq!(ValueInfo::new("x", ValueKind::Global).storage_name(), "x");
    }
}
