//! Engine errors.

use thiserror::Error;

/// A condition the engine refuses to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecError {
    /// INr/DCr with the memory operand. No 8008 implements it, so there is
    /// no behaviour to reproduce.
    #[error("unimplemented opcode {opcode:#04X} at {address:#06X}")]
    Unimplemented { opcode: u8, address: u16 },
}
