//! ROM and RAM behind one select bit.
//!
//! Layout with the default configuration:
//! - bit 11 clear: 2 KiB ROM, mirrored (writes ignored)
//! - bit 11 set: 2 KiB RAM, mirrored

use emu_core::Bus;
use tracing::trace;

use crate::config::MachineConfig;
use crate::error::MachineError;

pub struct Memory {
    rom: Vec<u8>,
    ram: Vec<u8>,
    ram_select: u16,
}

impl Memory {
    /// Build the memory map described by `config` and load its ROM.
    pub fn new(config: &MachineConfig) -> Result<Self, MachineError> {
        for (name, size) in [("ROM", config.rom_size), ("RAM", config.ram_size)] {
            if !size.is_power_of_two() {
                return Err(MachineError::Config(format!(
                    "{name} size {size} is not a power of two"
                )));
            }
        }
        if config.ram_select.count_ones() != 1 {
            return Err(MachineError::Config(format!(
                "RAM select {:#06X} must be a single address bit",
                config.ram_select
            )));
        }
        if config.rom.len() > config.rom_size {
            return Err(MachineError::RomTooLarge {
                size: config.rom.len(),
                capacity: config.rom_size,
            });
        }

        let mut rom = vec![0; config.rom_size];
        rom[..config.rom.len()].copy_from_slice(&config.rom);
        Ok(Self {
            rom,
            ram: vec![0; config.ram_size],
            ram_select: config.ram_select,
        })
    }

    const fn is_ram(&self, address: u16) -> bool {
        address & self.ram_select != 0
    }

    /// Read without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        let index = usize::from(address);
        if self.is_ram(address) {
            self.ram[index & (self.ram.len() - 1)]
        } else {
            self.rom[index & (self.rom.len() - 1)]
        }
    }

    #[must_use]
    pub fn rom(&self) -> &[u8] {
        &self.rom
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }
}

impl Bus for Memory {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        if self.is_ram(address) {
            let mask = self.ram.len() - 1;
            self.ram[usize::from(address) & mask] = value;
        } else {
            // ROM writes silently ignored
            trace!(address, value, "write to ROM ignored");
        }
    }
}
