//! Assembler errors.

use thiserror::Error;

/// An error that stops assembly. Line numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("invalid instruction '{text}' at line {line}")]
    InvalidInstruction { text: String, line: usize },

    #[error("unknown symbol '{name}' at line {line}")]
    UnknownSymbol { name: String, line: usize },

    #[error("duplicate symbol '{name}' at line {line}")]
    DuplicateSymbol { name: String, line: usize },

    #[error("invalid number '{text}' at line {line}")]
    InvalidNumber { text: String, line: usize },
}

impl AsmError {
    /// Source line the error refers to.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            AsmError::InvalidInstruction { line, .. }
            | AsmError::UnknownSymbol { line, .. }
            | AsmError::DuplicateSymbol { line, .. }
            | AsmError::InvalidNumber { line, .. } => *line,
        }
    }
}
