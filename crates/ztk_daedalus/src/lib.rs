//! Compiled Daedalus scripts (`.DAT`) and the virtual machine that runs
//! them.
//!
//! The loader builds a symbol table with three indices (position, name,
//! address) plus the decoded code segment; the VM is a synchronous
//! stack machine dispatching over the fixed-width instruction set, with
//! host-registered externals and per-call instance contexts.

mod instruction;
mod script;
mod symbol;
mod vm;

pub use instruction::{Instruction, Opcode};
pub use script::Script;
pub use symbol::{Datatype, Instance, InstancePtr, Symbol, SymbolFlags, SymbolValue};
pub use vm::{FromStack, IntoStack, Vm};

use ztk_io::BufferError;

/// Failures while loading a `.DAT` file.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("unknown opcode 0x{opcode:02X} at address {address}")]
    InvalidOpcode { opcode: u8, address: u32 },
    #[error("unknown symbol datatype {0}")]
    InvalidDatatype(u32),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Failures raised by symbol access and the VM at runtime.
#[derive(Debug, thiserror::Error)]
pub enum VmError {
    #[error("illegal access of type {expected:?} on symbol {symbol} of type {actual:?}")]
    IllegalTypeAccess {
        symbol: String,
        expected: Datatype,
        actual: Datatype,
    },
    #[error("illegal access of out-of-bounds index {index} while reading {symbol}")]
    IllegalIndexAccess { symbol: String, index: u16 },
    #[error("illegal mutable access of const symbol {symbol}")]
    IllegalConstAccess { symbol: String },
    #[error("illegal access of member {symbol} with a context of a different class")]
    IllegalInstanceAccess { symbol: String },
    #[error("illegal access of unbound member {symbol}")]
    UnboundMemberAccess { symbol: String },
    #[error("illegal access of member {symbol} without a context set")]
    NoContext { symbol: String },
    #[error("cannot access member {symbol} on an instance of class {context_class}")]
    IllegalContextType {
        symbol: String,
        context_class: String,
    },
    #[error("external {symbol} has illegal return type {provided:?}")]
    IllegalExternalRtype { symbol: String, provided: Datatype },
    #[error("external {symbol} has illegal parameter type {provided:?} (no. {index})")]
    IllegalExternalParam {
        symbol: String,
        provided: Datatype,
        index: u8,
    },
    #[error("symbol not found: {0}")]
    SymbolNotFound(String),
    #[error("symbol {0} is not an external function")]
    NotAnExternal(String),
    #[error("no symbol found for call address {0}")]
    UnresolvedFunction(u32),
    #[error("no external registered for {0}")]
    UnresolvedExternal(String),
    #[error("cannot jump to illegal address {0}")]
    IllegalJump(u32),
    #[error("popped an unexpected stack frame: expected {0}")]
    UnexpectedStackFrame(&'static str),
    #[error("popping from an empty stack")]
    EmptyStack,
    #[error("integer division by zero")]
    DivisionByZero,
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

pub type Result<T> = std::result::Result<T, VmError>;
