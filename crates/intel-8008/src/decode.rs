//! Opcode decode for the 8008.
//!
//! Every one of the 256 opcodes maps to exactly one [`Instruction`]. The
//! decode is a single exhaustive match on the class bits and the low three
//! bits, so the compiler checks that no byte falls through.

use std::fmt;

use crate::alu::{AluOp, Rotation};
use crate::flags::{Flag, Flags};
use crate::registers::{Operand, Reg};

/// The instruction class held in opcode bits 7..6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// `00`: increment/decrement, rotate, return, ALU immediate, restart,
    /// load immediate.
    Misc,
    /// `01`: jump, call, input, output.
    Branch,
    /// `10`: ALU with register or memory operand.
    Alu,
    /// `11`: register/memory load.
    Load,
}

impl Class {
    #[must_use]
    pub const fn of(opcode: u8) -> Self {
        match opcode >> 6 {
            0 => Class::Misc,
            1 => Class::Branch,
            2 => Class::Alu,
            _ => Class::Load,
        }
    }
}

/// A branch condition: the flag named by `CC`, tested for `when`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    pub flag: Flag,
    pub when: bool,
}

impl Condition {
    /// Decode bits 5..3 of a conditional opcode (`T CC`).
    #[must_use]
    pub const fn from_opcode(opcode: u8) -> Self {
        Self {
            flag: Flag::from_bits(opcode >> 3),
            when: opcode & 0x20 != 0,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        ((self.when as u8) << 5) | (self.flag.bits() << 3)
    }

    #[must_use]
    pub const fn holds(self, flags: Flags) -> bool {
        flags.get(self.flag) == self.when
    }

    /// `Tc` or `Fc` suffix, e.g. `TZ`.
    fn suffix(self) -> String {
        format!("{}{}", if self.when { 'T' } else { 'F' }, self.flag.letter())
    }
}

/// A decoded 8008 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `HLT`. Carries the opcode because three encodings alias it
    /// (`0x00`, `0x01` and `0xFF`).
    Halt(u8),
    /// INr/DCr aimed at memory (`0x38`, `0x39`). The chip has no such
    /// instruction, so executing it is an error.
    Unimplemented(u8),
    Increment(Reg),
    Decrement(Reg),
    Rotate(Rotation),
    Return(Option<Condition>),
    AluImmediate(AluOp),
    /// Restart to vector `n << 3`.
    Restart(u8),
    LoadImmediate(Operand),
    /// INP, ports 0..=7.
    Input(u8),
    /// OUT, ports 8..=31.
    Output(u8),
    Jump(Option<Condition>),
    Call(Option<Condition>),
    Alu(AluOp, Operand),
    Load { dst: Operand, src: Operand },
}

impl Instruction {
    /// Decode an opcode byte.
    #[must_use]
    pub const fn decode(opcode: u8) -> Self {
        let ddd = (opcode >> 3) & 0b111;
        let sss = opcode & 0b111;
        match Class::of(opcode) {
            Class::Misc => match sss {
                0 | 1 => match Operand::from_bits(ddd) {
                    Operand::Reg(Reg::A) => Instruction::Halt(opcode),
                    Operand::Memory => Instruction::Unimplemented(opcode),
                    Operand::Reg(r) if sss == 0 => Instruction::Increment(r),
                    Operand::Reg(r) => Instruction::Decrement(r),
                },
                2 => Instruction::Rotate(Rotation::from_bits(ddd)),
                3 => Instruction::Return(Some(Condition::from_opcode(opcode))),
                7 => Instruction::Return(None),
                4 => Instruction::AluImmediate(AluOp::from_bits(ddd)),
                5 => Instruction::Restart(ddd),
                _ => Instruction::LoadImmediate(Operand::from_bits(ddd)),
            },
            Class::Branch => {
                if opcode & 0x01 != 0 {
                    if opcode & 0x30 == 0 {
                        Instruction::Input((opcode >> 1) & 0x07)
                    } else {
                        Instruction::Output((opcode >> 1) & 0x1F)
                    }
                } else {
                    let cond = if opcode & 0x04 != 0 {
                        None
                    } else {
                        Some(Condition::from_opcode(opcode))
                    };
                    if opcode & 0x02 != 0 {
                        Instruction::Call(cond)
                    } else {
                        Instruction::Jump(cond)
                    }
                }
            }
            Class::Alu => Instruction::Alu(AluOp::from_bits(ddd), Operand::from_bits(sss)),
            Class::Load => {
                let dst = Operand::from_bits(ddd);
                let src = Operand::from_bits(sss);
                if matches!((dst, src), (Operand::Memory, Operand::Memory)) {
                    Instruction::Halt(opcode)
                } else {
                    Instruction::Load { dst, src }
                }
            }
        }
    }

    /// Canonical encoding. Don't-care bits are zero, so `RET` encodes as
    /// `0x07` and `JMP` as `0x44`.
    #[must_use]
    pub const fn encode(self) -> u8 {
        match self {
            Instruction::Halt(opcode) | Instruction::Unimplemented(opcode) => opcode,
            Instruction::Increment(r) => (r.index() as u8) << 3,
            Instruction::Decrement(r) => ((r.index() as u8) << 3) | 0x01,
            Instruction::Rotate(rot) => (rot.bits() << 3) | 0x02,
            Instruction::Return(Some(cond)) => cond.bits() | 0x03,
            Instruction::Return(None) => 0x07,
            Instruction::AluImmediate(op) => (op.bits() << 3) | 0x04,
            Instruction::Restart(vector) => ((vector & 0x07) << 3) | 0x05,
            Instruction::LoadImmediate(dst) => (dst.bits() << 3) | 0x06,
            Instruction::Input(port) => 0x41 | ((port & 0x07) << 1),
            Instruction::Output(port) => 0x41 | ((port & 0x1F) << 1),
            Instruction::Jump(Some(cond)) => 0x40 | cond.bits(),
            Instruction::Jump(None) => 0x44,
            Instruction::Call(Some(cond)) => 0x42 | cond.bits(),
            Instruction::Call(None) => 0x46,
            Instruction::Alu(op, src) => 0x80 | (op.bits() << 3) | src.bits(),
            Instruction::Load { dst, src } => 0xC0 | (dst.bits() << 3) | src.bits(),
        }
    }

    #[must_use]
    pub const fn class(self) -> Class {
        Class::of(self.encode())
    }

    /// Length in bytes, including immediate data or address.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(self) -> u8 {
        match self {
            Instruction::AluImmediate(_) | Instruction::LoadImmediate(_) => 2,
            Instruction::Jump(_) | Instruction::Call(_) => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub const fn is_halt(self) -> bool {
        matches!(self, Instruction::Halt(_))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Halt(_) => f.write_str("HLT"),
            Instruction::Unimplemented(_) => f.write_str("???"),
            Instruction::Increment(r) => write!(f, "IN{}", r.letter()),
            Instruction::Decrement(r) => write!(f, "DC{}", r.letter()),
            Instruction::Rotate(rot) => write!(f, "{rot}"),
            Instruction::Return(None) => f.write_str("RET"),
            Instruction::Return(Some(cond)) => write!(f, "R{}", cond.suffix()),
            Instruction::AluImmediate(op) => write!(f, "{}I", op.stem()),
            Instruction::Restart(vector) => write!(f, "RST/{vector}"),
            Instruction::LoadImmediate(dst) => write!(f, "L{}I", dst.letter()),
            Instruction::Input(port) => write!(f, "INP/{port}"),
            Instruction::Output(port) => write!(f, "OUT/{port}"),
            Instruction::Jump(None) => f.write_str("JMP"),
            Instruction::Jump(Some(cond)) => write!(f, "J{}", cond.suffix()),
            Instruction::Call(None) => f.write_str("CAL"),
            Instruction::Call(Some(cond)) => write!(f, "C{}", cond.suffix()),
            Instruction::Alu(op, src) => write!(f, "{}{}", op.stem(), src.letter()),
            Instruction::Load { dst, src } => write!(f, "L{}{}", dst.letter(), src.letter()),
        }
    }
}
