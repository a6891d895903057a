//! In-memory program front end
//!
//! [`ProgramModule`] holds the operation streams of both programs together
//! with the value metadata the engine asks for. Front ends that lower a real
//! compiler IR can either fill a `ProgramModule` or implement
//! [`ProgramFrontEnd`] directly.

use super::operation::{OpcodeClass, Operation, OperationId, SourceLocation};
use super::program::{PerProgram, ProgramId};
use super::value::{Value, ValueInfo, ValueKind};
use crate::config::NamingConvention;
use crate::shared::ports::ProgramFrontEnd;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Call site as seen by the simplified per-function control-flow graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub callee: String,
    pub location: Option<SourceLocation>,
}

/// Basic block with the call sites it contains, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockLayout {
    pub id: u32,
    pub successors: Vec<u32>,
    pub call_sites: Vec<CallSite>,
}

impl BlockLayout {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            successors: Vec::new(),
            call_sites: Vec::new(),
        }
    }

    pub fn with_successors(mut self, successors: impl IntoIterator<Item = u32>) -> Self {
        self.successors.extend(successors);
        self
    }

    pub fn with_call(mut self, callee: impl Into<String>, location: SourceLocation) -> Self {
        self.call_sites.push(CallSite {
            callee: callee.into(),
            location: Some(location),
        });
        self
    }
}

/// One function of one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionBody {
    pub name: String,
    pub program: ProgramId,
    pub params: Vec<Value>,
    pub is_entry_point: bool,
    pub operations: Vec<Operation>,
    /// Block structure; empty means "one block holding every call in order"
    pub blocks: Vec<BlockLayout>,
}

impl FunctionBody {
    pub fn new(name: impl Into<String>, program: ProgramId) -> Self {
        Self {
            name: name.into(),
            program,
            params: Vec::new(),
            is_entry_point: false,
            operations: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Function of a linked module, placed by its symbol name
    ///
    /// Both programs share one symbol namespace once linked; the naming
    /// convention's program-2 prefix tells them apart.
    pub fn linked(symbol: impl Into<String>, naming: &NamingConvention) -> Self {
        let name = symbol.into();
        let program = naming.program_of_symbol(&name);
        Self::new(name, program)
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }

    pub fn entry_point(mut self) -> Self {
        self.is_entry_point = true;
        self
    }

    pub fn with_operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }

    pub fn with_block(mut self, block: BlockLayout) -> Self {
        self.blocks.push(block);
        self
    }

    /// Block structure used for level computation
    pub fn layout(&self) -> Vec<BlockLayout> {
        if !self.blocks.is_empty() {
            return self.blocks.clone();
        }

        let call_sites = self
            .operations
            .iter()
            .filter_map(|op| {
                op.callee_name().map(|callee| CallSite {
                    callee: callee.to_string(),
                    location: op.location.clone(),
                })
            })
            .collect();

        vec![BlockLayout {
            id: 0,
            successors: Vec::new(),
            call_sites,
        }]
    }

    /// Values returned by this function
    pub fn returned_values(&self) -> Vec<Value> {
        self.operations
            .iter()
            .filter(|op| op.opcode == OpcodeClass::Return)
            .flat_map(|op| op.operands.iter().copied())
            .collect()
    }
}

/// Both programs' functions plus value metadata
#[derive(Debug, Clone, Default)]
pub struct ProgramModule {
    values: FxHashMap<Value, ValueInfo>,
    functions: Vec<FunctionBody>,
    /// result value -> (function index, operation index)
    definitions: FxHashMap<Value, (usize, usize)>,
    next_id: PerProgram<u32>,
    next_op: u32,
}

impl ProgramModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value and return its fresh identity
    pub fn add_value(&mut self, program: ProgramId, info: ValueInfo) -> Value {
        let next = self.next_id.get_mut(program);
        let value = Value::new(program, *next);
        *next += 1;
        self.values.insert(value, info);
        value
    }

    /// Scalar local (operation result or temporary)
    pub fn scalar(&mut self, program: ProgramId, name: &str) -> Value {
        self.add_value(program, ValueInfo::new(name, ValueKind::Instruction))
    }

    /// Pointer-typed local such as a stack buffer
    pub fn pointer(&mut self, program: ProgramId, name: &str) -> Value {
        self.add_value(program, ValueInfo::new(name, ValueKind::Instruction).pointer())
    }

    /// Pointer-typed global buffer
    pub fn global_buffer(&mut self, program: ProgramId, name: &str) -> Value {
        self.add_value(program, ValueInfo::new(name, ValueKind::Global).pointer())
    }

    pub fn argument(&mut self, program: ProgramId, name: &str, is_pointer: bool) -> Value {
        let info = ValueInfo::new(name, ValueKind::Argument);
        let info = if is_pointer { info.pointer() } else { info };
        self.add_value(program, info)
    }

    pub fn constant(&mut self, program: ProgramId, literal: &str) -> Value {
        self.add_value(program, ValueInfo::new(literal, ValueKind::Constant))
    }

    /// Global buffer of a linked module, placed by its symbol name
    pub fn linked_global(&mut self, naming: &NamingConvention, symbol: &str) -> Value {
        self.global_buffer(naming.program_of_symbol(symbol), symbol)
    }

    /// Add a function, number its operations and index the results they define
    ///
    /// Operation ids are module-wide; ids set by the caller are replaced.
    pub fn add_function(&mut self, mut function: FunctionBody) {
        let fn_idx = self.functions.len();
        for (op_idx, op) in function.operations.iter_mut().enumerate() {
            op.id = Some(OperationId(self.next_op));
            self.next_op += 1;
            if let Some(result) = op.result {
                self.definitions.insert(result, (fn_idx, op_idx));
            }
        }
        self.functions.push(function);
    }

    pub fn function(&self, name: &str, program: ProgramId) -> Option<&FunctionBody> {
        self.functions
            .iter()
            .find(|f| f.program == program && f.name == name)
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

impl ProgramFrontEnd for ProgramModule {
    fn value_info(&self, value: Value) -> Option<&ValueInfo> {
        self.values.get(&value)
    }

    fn defining_operation(&self, value: Value) -> Option<&Operation> {
        let &(fn_idx, op_idx) = self.definitions.get(&value)?;
        self.functions.get(fn_idx)?.operations.get(op_idx)
    }

    fn functions(&self) -> &[FunctionBody] {
        &self.functions
    }
}
