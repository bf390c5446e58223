use thiserror::Error;

use crate::constants::MAX_PROGRAM_SIZE;

/// Something went wrong while executing a single instruction.
///
/// Every fault is reported at the cycle boundary; the machine's state outside of
/// the faulting instruction is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The opcode doesn't match any instruction. The program counter has already
    /// been moved past it.
    #[error("unknown opcode {opcode:#06X} at {address:#05X}")]
    UnknownOpcode { opcode: u16, address: u16 },

    /// A subroutine call was made with every stack slot in use.
    #[error("stack overflow calling from {address:#05X}")]
    StackOverflow { address: u16 },

    /// A return was made with no subroutine to return from.
    #[error("stack underflow returning from {address:#05X}")]
    StackUnderflow { address: u16 },

    /// An instruction tried to read or write past the end of memory.
    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    /// A previous fault stopped the machine; it must be reset before stepping again.
    #[error("machine is halted")]
    Halted,
}

impl Fault {
    /// Whether the machine can carry on executing after this fault
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Fault::UnknownOpcode { .. })
    }
}

/// A program image couldn't be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("program is {size} bytes but at most {max} fit in memory", max = MAX_PROGRAM_SIZE)]
    TooLarge { size: usize },

    #[error("unable to read program: {0}")]
    Io(#[from] std::io::Error),
}
