//! Intel 8008 CPU engine.
//!
//! Each call to [`I8008::cycle`] runs one complete fetch/decode/execute
//! cycle. Every micro-state of that cycle (T1, T2, T3, ...) is a single
//! transaction on a [`PinBus`], which is the engine's only link to memory,
//! ports and interrupts.

mod alu;
mod bus;
mod cpu;
mod decode;
pub mod disasm;
mod error;
mod flags;
mod registers;

pub use alu::{AluOp, AluResult, Rotation};
pub use bus::{
    AddressLatch, BusState, CycleType, InterruptLine, IoCommand, MemoryPins, PinBus, Recorder,
    Transaction,
};
pub use cpu::{I8008, Step};
pub use decode::{Class, Condition, Instruction};
pub use error::ExecError;
pub use flags::{CARRY, Flag, Flags, PARITY, SIGN, ZERO, parity};
pub use registers::{ADDRESS_MASK, AddressStack, Operand, Reg, Registers};

/// Opcode the reference platform jams on an interrupt fetch (RST 1).
pub const RST_1: u8 = 0x0D;
