//! Disassembler for debug traces and listings.

use std::fmt;

use crate::decode::Instruction;

/// One disassembled instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub address: u16,
    pub instruction: Instruction,
    /// Bytes following the opcode; only the first `len() - 1` are used.
    pub operands: [u8; 2],
}

impl Line {
    /// Number of bytes this instruction occupies.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.instruction.len() as usize
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [lo, hi] = self.operands;
        match self.instruction.len() {
            2 => write!(f, "{} {lo:#04X}", self.instruction),
            3 => write!(
                f,
                "{} {:#06X}",
                self.instruction,
                (u16::from(hi) << 8) | u16::from(lo)
            ),
            _ => write!(f, "{}", self.instruction),
        }
    }
}

/// Disassemble the instruction starting at `bytes[0]`, which lives at
/// `address`. Missing operand bytes read as zero.
#[must_use]
pub fn disassemble_one(bytes: &[u8], address: u16) -> Line {
    let byte = |i: usize| bytes.get(i).copied().unwrap_or(0);
    Line {
        address,
        instruction: Instruction::decode(byte(0)),
        operands: [byte(1), byte(2)],
    }
}

/// Disassemble a whole image loaded at `origin`.
#[must_use]
pub fn disassemble(image: &[u8], origin: u16) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut offset = 0;
    while offset < image.len() {
        let line = disassemble_one(&image[offset..], origin.wrapping_add(offset as u16));
        offset += line.len();
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_operands() {
        assert_eq!(disassemble_one(&[0x06, 0x42], 0).to_string(), "LAI 0x42");
        assert_eq!(
            disassemble_one(&[0x44, 0x34, 0x12], 0).to_string(),
            "JMP 0x1234"
        );
        assert_eq!(disassemble_one(&[0xC7], 0).to_string(), "LAM");
        assert_eq!(disassemble_one(&[0xFF], 0).to_string(), "HLT");
    }

    #[test]
    fn truncated_operands_read_as_zero() {
        assert_eq!(disassemble_one(&[0x46], 0).to_string(), "CAL 0x0000");
    }

    #[test]
    fn listing_steps_by_length() {
        let lines = disassemble(&[0x06, 0x01, 0x44, 0x40, 0x00, 0xFF], 0x40);
        let addresses: Vec<u16> = lines.iter().map(|l| l.address).collect();
        assert_eq!(addresses, vec![0x40, 0x42, 0x45]);
        assert_eq!(lines[1].to_string(), "JMP 0x0040");
    }
}
