//! Program operations as streamed in by the front end

use super::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position of an operation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Coarse operation class; the engine does not need finer opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpcodeClass {
    Load,
    Store,
    Phi,
    Call,
    Alloca,
    GetElementPtr,
    Cast,
    Binary,
    Compare,
    Select,
    Return,
    Branch,
    Switch,
    Unreachable,
    Other,
}

impl OpcodeClass {
    /// Control-flow terminators are left out of the graph by default
    #[inline]
    pub fn is_terminator(self) -> bool {
        matches!(
            self,
            OpcodeClass::Return
                | OpcodeClass::Branch
                | OpcodeClass::Switch
                | OpcodeClass::Unreachable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OpcodeClass::Load => "load",
            OpcodeClass::Store => "store",
            OpcodeClass::Phi => "phi",
            OpcodeClass::Call => "call",
            OpcodeClass::Alloca => "alloca",
            OpcodeClass::GetElementPtr => "getelementptr",
            OpcodeClass::Cast => "cast",
            OpcodeClass::Binary => "binary",
            OpcodeClass::Compare => "compare",
            OpcodeClass::Select => "select",
            OpcodeClass::Return => "ret",
            OpcodeClass::Branch => "br",
            OpcodeClass::Switch => "switch",
            OpcodeClass::Unreachable => "unreachable",
            OpcodeClass::Other => "op",
        }
    }
}

/// Statically known call target
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionRef {
    pub name: String,
}

impl FunctionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Identity of an operation, unique within one front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u32);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// One program operation
///
/// Store operands follow the usual `[stored value, destination pointer]`
/// order. Call operands are the actual arguments in order.
///
/// `id` is assigned when the operation is registered with a front end.
/// Graph construction only remembers operations that carry one; an
/// unregistered operation is recognized again solely through its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub id: Option<OperationId>,
    pub opcode: OpcodeClass,
    pub operands: Vec<Value>,
    pub call_target: Option<FunctionRef>,
    pub location: Option<SourceLocation>,
    pub result: Option<Value>,
}

impl Operation {
    pub fn new(opcode: OpcodeClass, operands: Vec<Value>) -> Self {
        Self {
            id: None,
            opcode,
            operands,
            call_target: None,
            location: None,
            result: None,
        }
    }

    pub fn call(target: impl Into<String>, args: Vec<Value>) -> Self {
        Self::new(OpcodeClass::Call, args).with_target(target)
    }

    pub fn store(value: Value, destination: Value) -> Self {
        Self::new(OpcodeClass::Store, vec![value, destination])
    }

    pub fn load(pointer: Value, result: Value) -> Self {
        Self::new(OpcodeClass::Load, vec![pointer]).with_result(result)
    }

    pub fn with_id(mut self, id: OperationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.call_target = Some(FunctionRef::new(target));
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(SourceLocation::new(file, line));
        self
    }

    /// Callee name for direct calls
    pub fn callee_name(&self) -> Option<&str> {
        if self.opcode != OpcodeClass::Call {
            return None;
        }
        self.call_target.as_ref().map(|t| t.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::ProgramId;

    #[test]
    fn test_callee_name_only_for_calls() {
        let v = Value::new(ProgramId::First, 1);
        let call = Operation::call("recv", vec![v]);
        assert_eq!(call.callee_name(), Some("recv"));

        let load = Operation::load(v, Value::new(ProgramId::First, 2)).with_target("recv");
        assert_eq!(load.callee_name(), None);
    }

    #[test]
    fn test_terminators() {
        assert!(OpcodeClass::Return.is_terminator());
        assert!(OpcodeClass::Branch.is_terminator());
        assert!(!OpcodeClass::Store.is_terminator());
    }
}
