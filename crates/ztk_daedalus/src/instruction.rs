use num_enum::TryFromPrimitive;

use ztk_io::Buffer;

use crate::ScriptError;

/// The Daedalus instruction set.
///
/// Arithmetic pops `a` (top of stack) then `b` and computes `a OP b`.
/// The `Assign*` family pops the destination reference from the top of
/// the stack and the source value after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    Add = 0,
    Subtract = 1,
    Multiply = 2,
    Divide = 3,
    Modulo = 4,
    BitOr = 5,
    BitAnd = 6,
    Less = 7,
    Greater = 8,
    AssignInt = 9,
    Or = 11,
    And = 12,
    ShiftLeft = 13,
    ShiftRight = 14,
    LessOrEqual = 15,
    Equal = 16,
    NotEqual = 17,
    GreaterOrEqual = 18,
    AssignAdd = 19,
    AssignSubtract = 20,
    AssignMultiply = 21,
    AssignDivide = 22,
    Plus = 30,
    Minus = 31,
    Not = 32,
    Complement = 33,
    Noop = 45,
    Return = 60,
    Call = 61,
    CallExternal = 62,
    PushInt = 64,
    PushVar = 65,
    PushInstance = 67,
    AssignString = 70,
    AssignStringRef = 71,
    AssignFunc = 72,
    AssignFloat = 73,
    AssignInstance = 74,
    Jump = 75,
    JumpIfZero = 76,
    SetInstance = 80,
    PushArrayVar = 245,
}

/// One decoded instruction. `size` is the number of bytes it occupies
/// in the code segment, derived from the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Opcode,
    pub size: u32,
    pub address: u32,
    pub symbol: u32,
    pub immediate: i32,
    pub index: u8,
}

impl Instruction {
    pub(crate) fn decode(buf: &mut Buffer) -> Result<Instruction, ScriptError> {
        let at = buf.position() as u32;
        let raw = buf.get_u8()?;
        let op = Opcode::try_from(raw).map_err(|_| ScriptError::InvalidOpcode {
            opcode: raw,
            address: at,
        })?;

        let mut instruction = Instruction {
            op,
            size: 1,
            address: 0,
            symbol: 0,
            immediate: 0,
            index: 0,
        };

        match op {
            Opcode::Call | Opcode::Jump | Opcode::JumpIfZero => {
                instruction.address = buf.get_u32()?;
                instruction.size += 4;
            }
            Opcode::PushInt => {
                instruction.immediate = buf.get_i32()?;
                instruction.size += 4;
            }
            Opcode::CallExternal
            | Opcode::PushVar
            | Opcode::PushInstance
            | Opcode::SetInstance => {
                instruction.symbol = buf.get_u32()?;
                instruction.size += 4;
            }
            Opcode::PushArrayVar => {
                instruction.symbol = buf.get_u32()?;
                instruction.index = buf.get_u8()?;
                instruction.size += 5;
            }
            _ => {}
        }

        Ok(instruction)
    }
}
