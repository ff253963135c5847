use thiserror::Error;

// Machine-level faults. All of these are fatal to the run that hit them;
// recovery is the embedding application's call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmuError {
    #[error("addressing fault: {addr:#06x} outside memory of {size} words")]
    AddressingFault { addr: u16, size: usize },

    #[error("load of {len} words at {offset:#06x} overflows memory of {size} words")]
    LoadOverflow {
        offset: u16,
        len: usize,
        size: usize,
    },

    #[error("unknown opcode in word {word:#06x} at {pc:#06x}")]
    UnknownOpcode { word: u16, pc: u16 },

    #[error("write through a literal operand")]
    IllegalWrite,
}
