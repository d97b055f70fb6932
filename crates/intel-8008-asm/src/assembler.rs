//! Two-pass assembler.
//!
//! The first pass walks the source line by line, emitting opcodes and data
//! and reserving room for every symbol reference. The second pass patches
//! the reserved bytes once all labels are known.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use intel_8008::{ADDRESS_MASK, Instruction};
use tracing::{debug, warn};

use crate::error::AsmError;
use crate::mnemonic::{self, parse_number};

/// An assembled image plus its symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    image: Vec<u8>,
    symbols: BTreeMap<String, u16>,
    end: u16,
}

impl Program {
    /// Bytes from address 0 up to the highest byte written. Gaps left by
    /// `.org` are zero.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn into_image(self) -> Vec<u8> {
        self.image
    }

    /// Address of a label.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<u16> {
        self.symbols.get(name).copied()
    }

    #[must_use]
    pub fn symbols(&self) -> &BTreeMap<String, u16> {
        &self.symbols
    }

    /// Location counter after the last line.
    #[must_use]
    pub fn end(&self) -> u16 {
        self.end
    }
}

/// Which bytes of a symbol's address a reference takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    /// `name`: low byte then high byte.
    Word,
    /// `name/L`
    Low,
    /// `name/H`
    High,
}

impl Width {
    const fn bytes(self) -> u16 {
        match self {
            Width::Word => 2,
            Width::Low | Width::High => 1,
        }
    }
}

/// A use of a symbol, patched during linking.
#[derive(Debug, Clone)]
struct Reference {
    name: String,
    at: u16,
    width: Width,
    line: usize,
}

/// Symbol definition: address and the line that defined it.
#[derive(Debug, Clone, Copy)]
struct Definition {
    address: u16,
    line: usize,
}

#[derive(Default)]
struct Assembler {
    pc: u16,
    line: usize,
    image: Vec<u8>,
    symbols: BTreeMap<String, Definition>,
    references: Vec<Reference>,
}

/// Assemble `source` into a program image.
pub fn assemble(source: &str) -> Result<Program, AsmError> {
    let mut asm = Assembler::default();
    for (index, text) in source.lines().enumerate() {
        asm.line = index + 1;
        asm.assemble_line(text)?;
    }
    asm.link()
}

impl Assembler {
    fn assemble_line(&mut self, text: &str) -> Result<(), AsmError> {
        let mut rest = strip_comment(text);
        if let Some((label, after)) = split_label(rest) {
            self.define(label.trim())?;
            rest = after;
        }

        let mut tokens = tokenize(rest).into_iter();
        let Some(head) = tokens.next() else {
            return Ok(());
        };
        let params: Vec<&str> = tokens.collect();

        match head {
            ".org" => self.org(&params),
            ".set" => self.emit_params(&params).map(|_| ()),
            _ => self.instruction(head, &params),
        }
    }

    fn define(&mut self, name: &str) -> Result<(), AsmError> {
        if !is_identifier(name) {
            return Err(self.invalid(name));
        }
        match self.symbols.entry(name.to_owned()) {
            Entry::Occupied(_) => Err(AsmError::DuplicateSymbol {
                name: name.to_owned(),
                line: self.line,
            }),
            Entry::Vacant(slot) => {
                debug!(name, address = self.pc, "label");
                slot.insert(Definition {
                    address: self.pc,
                    line: self.line,
                });
                Ok(())
            }
        }
    }

    fn org(&mut self, params: &[&str]) -> Result<(), AsmError> {
        let [param] = params else {
            return Err(self.invalid(".org"));
        };
        let address = self.number(param)?;
        if address > u32::from(ADDRESS_MASK) {
            return Err(self.bad_number(param));
        }
        self.pc = address as u16;
        debug!(address = self.pc, line = self.line, ".org");
        Ok(())
    }

    fn instruction(&mut self, mnemonic: &str, params: &[&str]) -> Result<(), AsmError> {
        let opcode = mnemonic::lookup(mnemonic).ok_or_else(|| self.invalid(mnemonic))?;
        self.emit(opcode);

        let operand_bytes = self.emit_params(params)?;
        let expected = u16::from(Instruction::decode(opcode).len() - 1);
        if operand_bytes != expected {
            warn!(
                line = self.line,
                mnemonic,
                expected,
                found = operand_bytes,
                "operand size does not match instruction"
            );
        }
        Ok(())
    }

    /// Emit each parameter in turn, returning the number of bytes produced.
    fn emit_params(&mut self, params: &[&str]) -> Result<u16, AsmError> {
        let mut bytes = 0;
        for param in params {
            bytes += self.emit_param(param)?;
        }
        Ok(bytes)
    }

    fn emit_param(&mut self, param: &str) -> Result<u16, AsmError> {
        if let Some(literal) = param.strip_prefix('\'') {
            let value = char_literal(literal).ok_or_else(|| self.bad_number(param))?;
            self.emit(value);
            return Ok(1);
        }

        if param.starts_with(|c: char| c.is_ascii_digit()) {
            let value = u8::try_from(self.number(param)?).map_err(|_| self.bad_number(param))?;
            self.emit(value);
            return Ok(1);
        }

        let (name, width) = match param.split_once('/') {
            None => (param, Width::Word),
            Some((name, "L")) => (name, Width::Low),
            Some((name, "H")) => (name, Width::High),
            Some(_) => return Err(self.invalid(param)),
        };
        if !is_identifier(name) {
            return Err(self.invalid(param));
        }
        self.references.push(Reference {
            name: name.to_owned(),
            at: self.pc,
            width,
            line: self.line,
        });
        for _ in 0..width.bytes() {
            self.emit(0);
        }
        Ok(width.bytes())
    }

    fn emit(&mut self, value: u8) {
        self.put(self.pc, value);
        self.pc = (self.pc + 1) & ADDRESS_MASK;
    }

    fn put(&mut self, address: u16, value: u8) {
        let index = usize::from(address);
        if self.image.len() <= index {
            self.image.resize(index + 1, 0);
        }
        self.image[index] = value;
    }

    fn number(&self, text: &str) -> Result<u32, AsmError> {
        parse_number(text).ok_or_else(|| self.bad_number(text))
    }

    fn invalid(&self, text: &str) -> AsmError {
        AsmError::InvalidInstruction {
            text: text.to_owned(),
            line: self.line,
        }
    }

    fn bad_number(&self, text: &str) -> AsmError {
        AsmError::InvalidNumber {
            text: text.to_owned(),
            line: self.line,
        }
    }

    /// Second pass: patch every reference with its symbol's address.
    fn link(mut self) -> Result<Program, AsmError> {
        for reference in std::mem::take(&mut self.references) {
            let Some(address) = self.symbols.get(&reference.name).map(|def| def.address) else {
                return Err(AsmError::UnknownSymbol {
                    name: reference.name,
                    line: reference.line,
                });
            };
            let [low, high] = address.to_le_bytes();
            match reference.width {
                Width::Word => {
                    self.put(reference.at, low);
                    self.put((reference.at + 1) & ADDRESS_MASK, high);
                }
                Width::Low => self.put(reference.at, low),
                Width::High => self.put(reference.at, high),
            }
        }

        for (name, def) in &self.symbols {
            debug!(name = name.as_str(), address = def.address, line = def.line, "symbol");
        }
        Ok(Program {
            image: self.image,
            symbols: self
                .symbols
                .into_iter()
                .map(|(name, def)| (name, def.address))
                .collect(),
            end: self.pc,
        })
    }
}

/// Drop everything from the first `;` that is not inside a character
/// literal.
fn strip_comment(text: &str) -> &str {
    let mut in_literal = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' => in_literal = !in_literal,
            ';' if !in_literal => return &text[..i],
            _ => {}
        }
    }
    text
}

/// Split `label: rest`. A colon inside a character literal is not a label.
fn split_label(text: &str) -> Option<(&str, &str)> {
    let colon = text.find(':')?;
    if text[..colon].contains('\'') {
        return None;
    }
    Some((&text[..colon], &text[colon + 1..]))
}

/// Split on whitespace, keeping `'c'` literals (which may hold a space)
/// as single tokens.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        let len = if rest.starts_with('\'') {
            rest[1..]
                .find('\'')
                .map_or(rest.len(), |close| close + 2)
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        tokens.push(&rest[..len]);
        rest = rest[len..].trim_start();
    }
    tokens
}

/// The byte for the body of a `'c'` literal (after the opening quote).
fn char_literal(body: &str) -> Option<u8> {
    let mut chars = body.chars();
    let c = chars.next()?;
    match (chars.next(), chars.next()) {
        (Some('\''), None) if c.is_ascii() => Some(c as u8),
        _ => None,
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
