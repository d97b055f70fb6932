//! 8008 register file and address stack.

use crate::flags::Flags;

/// Mask for the 8008's 14-bit address bus.
pub const ADDRESS_MASK: u16 = 0x3FFF;

/// A general-purpose register, numbered as in the `DDD`/`SSS` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Reg {
    pub const ALL: [Reg; 7] = [Reg::A, Reg::B, Reg::C, Reg::D, Reg::E, Reg::H, Reg::L];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Reg::A => 0,
            Reg::B => 1,
            Reg::C => 2,
            Reg::D => 3,
            Reg::E => 4,
            Reg::H => 5,
            Reg::L => 6,
        }
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Reg::A => 'A',
            Reg::B => 'B',
            Reg::C => 'C',
            Reg::D => 'D',
            Reg::E => 'E',
            Reg::H => 'H',
            Reg::L => 'L',
        }
    }
}

/// A register field: either a register, or `M`, the byte at H:L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    Reg(Reg),
    Memory,
}

impl Operand {
    /// Decode a 3-bit register field. Value 7 selects memory.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Operand::Reg(Reg::A),
            1 => Operand::Reg(Reg::B),
            2 => Operand::Reg(Reg::C),
            3 => Operand::Reg(Reg::D),
            4 => Operand::Reg(Reg::E),
            5 => Operand::Reg(Reg::H),
            6 => Operand::Reg(Reg::L),
            _ => Operand::Memory,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Operand::Reg(r) => r.index() as u8,
            Operand::Memory => 7,
        }
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Operand::Reg(r) => r.letter(),
            Operand::Memory => 'M',
        }
    }
}

/// The 8-level address stack.
///
/// The slot at `index` is the program counter; the others hold return
/// addresses. The index wraps modulo 8 in both directions, so a ninth
/// nested call silently overwrites the oldest entry, exactly as the chip
/// does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressStack {
    slots: [u16; 8],
    index: u8,
}

impl AddressStack {
    pub const DEPTH: usize = 8;

    /// The program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.slots[self.index as usize]
    }

    pub fn set_pc(&mut self, address: u16) {
        self.slots[self.index as usize] = address & ADDRESS_MASK;
    }

    /// Increment the program counter, wrapping within 14 bits.
    pub fn advance_pc(&mut self) {
        self.set_pc(self.pc().wrapping_add(1));
    }

    /// Advance the index, then make `target` the new program counter.
    pub fn push(&mut self, target: u16) {
        self.index = (self.index + 1) % Self::DEPTH as u8;
        self.set_pc(target);
    }

    /// Retreat the index. The slot below becomes the program counter again.
    pub fn pop(&mut self) -> u16 {
        self.index = (self.index + Self::DEPTH as u8 - 1) % Self::DEPTH as u8;
        self.pc()
    }

    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }

    #[must_use]
    pub const fn slot(&self, index: usize) -> u16 {
        self.slots[index % Self::DEPTH]
    }

    #[must_use]
    pub const fn slots(&self) -> [u16; 8] {
        self.slots
    }
}

/// 8008 register set snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    regs: [u8; 7],
    pub flags: Flags,
    pub stack: AddressStack,
}

impl Registers {
    #[must_use]
    pub const fn get(&self, r: Reg) -> u8 {
        self.regs[r.index()]
    }

    pub fn set(&mut self, r: Reg, value: u8) {
        self.regs[r.index()] = value;
    }

    /// Accumulator.
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.regs[0]
    }

    pub fn set_a(&mut self, value: u8) {
        self.regs[0] = value;
    }

    /// The memory pointer H:L, truncated to the 14-bit bus.
    #[must_use]
    pub const fn hl(&self) -> u16 {
        ((self.get(Reg::H) as u16) << 8 | self.get(Reg::L) as u16) & ADDRESS_MASK
    }

    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.stack.pc()
    }
}
