//! Shared models

mod direction;
mod module;
mod operation;
mod program;
mod value;

pub use direction::NetDirection;
pub use module::{BlockLayout, CallSite, FunctionBody, ProgramModule};
pub use operation::{FunctionRef, OpcodeClass, Operation, OperationId, SourceLocation};
pub use program::{PerProgram, ProgramId};
pub use value::{Value, ValueId, ValueInfo, ValueKind};
