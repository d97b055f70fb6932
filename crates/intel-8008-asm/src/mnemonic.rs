//! Mnemonic to opcode lookup.
//!
//! The table is the engine's decoder run backwards: every opcode is decoded,
//! printed, and its canonical encoding filed under the printed name. That
//! keeps the assembler and the disassembler agreeing on every spelling.

use std::collections::HashMap;
use std::sync::LazyLock;

use intel_8008::{Instruction, Rotation};

static TABLE: LazyLock<HashMap<String, u8>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    for opcode in 0..=255u8 {
        let instruction = Instruction::decode(opcode);
        if matches!(
            instruction,
            Instruction::Unimplemented(_) | Instruction::Rotate(Rotation::Inert(_))
        ) {
            continue;
        }
        table
            .entry(instruction.to_string())
            .or_insert_with(|| instruction.encode());
    }
    table.insert("HALT".to_owned(), Instruction::Halt(0x00).encode());
    table
});

/// Parse a number: `0x` hex, leading-zero octal, or decimal.
pub(crate) fn parse_number(text: &str) -> Option<u32> {
    if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        u32::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

/// Opcode for `mnemonic`, or `None` if it names no instruction.
///
/// `INP/n`, `OUT/n` and `RST/n` take their number in any base. `OUT/0` to
/// `OUT/7` are shorthand for ports 24 to 31, matching older sources that
/// numbered output ports from the top of the range.
#[must_use]
pub fn lookup(mnemonic: &str) -> Option<u8> {
    let mnemonic = mnemonic.to_ascii_uppercase();
    let Some((stem, arg)) = mnemonic.split_once('/') else {
        return TABLE.get(&mnemonic).copied();
    };
    let n = u8::try_from(parse_number(arg)?).ok()?;
    let instruction = match stem {
        "INP" if n < 8 => Instruction::Input(n),
        "OUT" if n < 8 => Instruction::Output(n + 24),
        "OUT" if n < 32 => Instruction::Output(n),
        "RST" if n < 8 => Instruction::Restart(n),
        _ => return None,
    };
    Some(instruction.encode())
}
