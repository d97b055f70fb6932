//! Machine errors.

use std::io;

use intel_8008::ExecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MachineError {
    /// The CPU hit an instruction it cannot execute.
    #[error("CPU fault: {0}")]
    Exec(#[from] ExecError),

    #[error("ROM image is {size} bytes but the ROM holds {capacity}")]
    RomTooLarge { size: usize, capacity: usize },

    #[error("invalid machine configuration: {0}")]
    Config(String),

    #[error("console I/O failed: {0}")]
    Console(#[from] io::Error),
}
