//! ALU operations for the 8008.

use std::fmt;

/// The eight accumulator operations selected by the `OOO` opcode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AluOp {
    Add,
    AddCarry,
    Sub,
    SubBorrow,
    And,
    Xor,
    Or,
    Compare,
}

impl AluOp {
    pub const ALL: [AluOp; 8] = [
        AluOp::Add,
        AluOp::AddCarry,
        AluOp::Sub,
        AluOp::SubBorrow,
        AluOp::And,
        AluOp::Xor,
        AluOp::Or,
        AluOp::Compare,
    ];

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0b111) as usize]
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            AluOp::Add => 0,
            AluOp::AddCarry => 1,
            AluOp::Sub => 2,
            AluOp::SubBorrow => 3,
            AluOp::And => 4,
            AluOp::Xor => 5,
            AluOp::Or => 6,
            AluOp::Compare => 7,
        }
    }

    /// Two-letter mnemonic stem (`AD` in `ADB`, `ADI`, ...).
    #[must_use]
    pub const fn stem(self) -> &'static str {
        match self {
            AluOp::Add => "AD",
            AluOp::AddCarry => "AC",
            AluOp::Sub => "SU",
            AluOp::SubBorrow => "SB",
            AluOp::And => "ND",
            AluOp::Xor => "XR",
            AluOp::Or => "OR",
            AluOp::Compare => "CP",
        }
    }

    #[must_use]
    pub fn from_stem(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.stem() == stem)
    }
}

/// Result of an ALU operation.
///
/// `carry` is `None` for operations that leave the carry flip-flop alone.
/// Zero, sign and parity are always derived from `value` by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub carry: Option<bool>,
}

/// Apply `op` to the accumulator `a` and operand `b`.
///
/// For `Compare` the returned value is the difference; the caller discards
/// it and keeps only the flags.
#[must_use]
pub fn execute(op: AluOp, a: u8, b: u8, carry: bool) -> AluResult {
    let (a, b, c) = (u16::from(a), u16::from(b), u16::from(carry));
    let wide = match op {
        AluOp::Add => a + b,
        AluOp::AddCarry => a + b + c,
        AluOp::Sub | AluOp::Compare => a.wrapping_sub(b),
        AluOp::SubBorrow => a.wrapping_sub(b).wrapping_sub(c),
        AluOp::And => a & b,
        AluOp::Xor => a ^ b,
        AluOp::Or => a | b,
    };
    let carry = match op {
        AluOp::And | AluOp::Xor | AluOp::Or => None,
        _ => Some(wide & 0x100 != 0),
    };
    AluResult {
        value: wide as u8,
        carry,
    }
}

/// INr. Carry is never affected.
#[must_use]
pub const fn inc(value: u8) -> u8 {
    value.wrapping_add(1)
}

/// DCr. Carry is never affected.
#[must_use]
pub const fn dec(value: u8) -> u8 {
    value.wrapping_sub(1)
}

/// Accumulator rotates, selected by opcode bits 5..3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Rotate left circular: bit 7 goes to bit 0 and to carry.
    Rlc,
    /// Rotate right circular: bit 0 goes to bit 7 and to carry.
    Rrc,
    /// Rotate left through carry.
    Ral,
    /// Rotate right through carry.
    Rar,
    /// `0x22`, `0x2A`, `0x32`, `0x3A`: selector 4..=7. Leaves A and carry
    /// unchanged.
    Inert(u8),
}

impl Rotation {
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Rotation::Rlc,
            1 => Rotation::Rrc,
            2 => Rotation::Ral,
            3 => Rotation::Rar,
            n => Rotation::Inert(n),
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Rotation::Rlc => 0,
            Rotation::Rrc => 1,
            Rotation::Ral => 2,
            Rotation::Rar => 3,
            Rotation::Inert(n) => n & 0b111,
        }
    }

    /// Returns the new accumulator and the new carry.
    #[must_use]
    pub const fn apply(self, a: u8, carry: bool) -> (u8, bool) {
        let a7 = a & 0x80 != 0;
        let a0 = a & 0x01 != 0;
        match self {
            Rotation::Rlc => (a.rotate_left(1), a7),
            Rotation::Rrc => (a.rotate_right(1), a0),
            Rotation::Ral => ((a << 1) | carry as u8, a7),
            Rotation::Rar => ((a >> 1) | ((carry as u8) << 7), a0),
            Rotation::Inert(_) => (a, carry),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rotation::Rlc => f.write_str("RLC"),
            Rotation::Rrc => f.write_str("RRC"),
            Rotation::Ral => f.write_str("RAL"),
            Rotation::Rar => f.write_str("RAR"),
            Rotation::Inert(n) => write!(f, "ROT/{n}"),
        }
    }
}
