//! Assembler for Intel 8008 programs.
//!
//! Source is line oriented:
//!
//! ```text
//! ; comment
//!         .org 0x40
//! loop:   ADI 1           ; mnemonic, then operand bytes
//!         JMP loop        ; a bare symbol emits its address, low byte first
//!         LHI msg/H       ; /H and /L take one byte of the address
//! msg:    .set 'h' 'i' 0
//! ```
//!
//! Numbers are decimal, `0x` hex or leading-zero octal. Symbols may be used
//! before they are defined.

mod assembler;
mod error;
mod mnemonic;

pub use assembler::{Program, assemble};
pub use error::AsmError;
pub use mnemonic::lookup;
