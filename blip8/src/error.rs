//! Result and errors.
use std::fmt::{self, Display, Formatter};

pub type Blip8Result<T> = std::result::Result<T, Blip8Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blip8Error {
    /// Attempt to load a program with no bytes in it.
    EmptyProgram,
    /// Attempt to load a program that can't fit in memory.
    ProgramTooLarge,
    /// Instruction pattern that doesn't match any of the canonical opcodes.
    UnknownOpcode(u16),
    /// Binary-coded decimal store at an index register too close
    /// to the end of memory.
    BcdOutOfBounds(u16),
    /// Subroutine return with no return address on the call stack.
    StackUnderflow,
}

impl Display for Blip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyProgram => write!(f, "no program bytes supplied"),
            Self::ProgramTooLarge => write!(f, "program too large for VM memory"),
            Self::UnknownOpcode(code) => write!(f, "unrecognized instruction {code:04X}"),
            Self::BcdOutOfBounds(addr) => {
                write!(f, "BCD store at {addr:04X} would write past memory bounds")
            }
            Self::StackUnderflow => write!(f, "call stack underflow"),
        }
    }
}

impl std::error::Error for Blip8Error {}
