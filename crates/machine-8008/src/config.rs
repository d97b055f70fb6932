//! Machine configuration.

use intel_8008::RST_1;

/// Configuration for creating a [`Machine`](crate::Machine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// ROM contents, loaded from address 0. May be shorter than `rom_size`.
    pub rom: Vec<u8>,
    /// ROM size in bytes. Must be a power of two; the ROM mirrors.
    pub rom_size: usize,
    /// RAM size in bytes. Must be a power of two; the RAM mirrors.
    pub ram_size: usize,
    /// Address bit that selects RAM. With it clear, the access goes to ROM.
    pub ram_select: u16,
    /// Opcode jammed onto the bus when the CPU acknowledges an interrupt.
    pub interrupt_opcode: u8,
}

impl Default for MachineConfig {
    /// 2 KiB ROM, 2 KiB RAM selected by address bit 11, RST 1 on interrupt.
    fn default() -> Self {
        Self {
            rom: Vec::new(),
            rom_size: 0x0800,
            ram_size: 0x0800,
            ram_select: 0x0800,
            interrupt_opcode: RST_1,
        }
    }
}

impl MachineConfig {
    /// Default configuration with the given ROM image.
    #[must_use]
    pub fn with_rom(rom: Vec<u8>) -> Self {
        Self {
            rom,
            ..Self::default()
        }
    }
}
