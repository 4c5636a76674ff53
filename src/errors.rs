use std::io;
use thiserror::Error;

/// Everything that can end an emulation session. None of these are
/// recoverable: a bad opcode or a bounds violation means the program is
/// corrupt or has walked off the rails, so the interpreter stops rather
/// than carry on with undefined state.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),

    #[error("call stack overflow (depth 16 exceeded)")]
    StackOverflow,

    #[error("return with an empty call stack")]
    StackUnderflow,

    #[error("memory access out of range at {0:#05x}")]
    AddressOutOfRange(u16),

    #[error(transparent)]
    Io(#[from] io::Error),
}
