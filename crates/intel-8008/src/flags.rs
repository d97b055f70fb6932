//! 8008 flag flip-flops.
//!
//! The 8008 has four independent flag flip-flops rather than a status
//! register. The packed layout below is only what the engine drives on the
//! bus during the T4 state of an INP cycle.

/// Carry flag (bit 0) - carry/borrow out of bit 7, or the bit rotated out.
pub const CARRY: u8 = 0b0000_0001;

/// Zero flag (bit 1) - set if result is zero.
pub const ZERO: u8 = 0b0000_0010;

/// Sign flag (bit 2) - copy of bit 7 of the result.
pub const SIGN: u8 = 0b0000_0100;

/// Parity flag (bit 3) - set if the result has an even number of 1 bits.
pub const PARITY: u8 = 0b0000_1000;

/// Compute parity of a byte (true if even number of 1 bits).
#[must_use]
pub const fn parity(value: u8) -> bool {
    value.count_ones() & 1 == 0
}

/// One of the four testable flags, as selected by the `CC` field of
/// conditional jump, call and return opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Carry,
    Zero,
    Sign,
    Parity,
}

impl Flag {
    /// Decode a 2-bit condition field.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Flag::Carry,
            1 => Flag::Zero,
            2 => Flag::Sign,
            _ => Flag::Parity,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Flag::Carry => 0,
            Flag::Zero => 1,
            Flag::Sign => 2,
            Flag::Parity => 3,
        }
    }

    /// Letter used in mnemonics (`JTZ`, `CFC`, ...).
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Flag::Carry => 'C',
            Flag::Zero => 'Z',
            Flag::Sign => 'S',
            Flag::Parity => 'P',
        }
    }
}

/// The flag flip-flops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags {
    pub carry: bool,
    pub zero: bool,
    pub sign: bool,
    pub parity: bool,
}

impl Flags {
    /// Recompute zero, sign and parity from a result. Carry is untouched.
    pub fn set_zsp(&mut self, value: u8) {
        self.zero = value == 0;
        self.sign = value & 0x80 != 0;
        self.parity = parity(value);
    }

    #[must_use]
    pub const fn get(self, flag: Flag) -> bool {
        match flag {
            Flag::Carry => self.carry,
            Flag::Zero => self.zero,
            Flag::Sign => self.sign,
            Flag::Parity => self.parity,
        }
    }

    /// Pack into the layout driven on the bus during an INP cycle.
    #[must_use]
    pub const fn bits(self) -> u8 {
        let mut f = 0;
        if self.carry {
            f |= CARRY;
        }
        if self.zero {
            f |= ZERO;
        }
        if self.sign {
            f |= SIGN;
        }
        if self.parity {
            f |= PARITY;
        }
        f
    }

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            carry: bits & CARRY != 0,
            zero: bits & ZERO != 0,
            sign: bits & SIGN != 0,
            parity: bits & PARITY != 0,
        }
    }
}
