//! Memory bus interface.

/// Size of the 8008's 14-bit address space.
pub const ADDRESS_SPACE: usize = 0x4000;

/// Memory bus interface.
///
/// Platforms resolve the address latched during T1/T2 through this trait.
/// Addresses are 14 bits wide; implementations mask or mirror as the
/// hardware they model does.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// Flat RAM covering the whole 14-bit address space.
///
/// Used by tests and by simple platforms that have no ROM region.
#[derive(Clone)]
pub struct SimpleBus {
    memory: Box<[u8; ADDRESS_SPACE]>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; ADDRESS_SPACE]),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at 16 KiB.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            let addr = (usize::from(address) + offset) % ADDRESS_SPACE;
            self.memory[addr] = byte;
        }
    }

    /// Read without going through the `Bus` trait.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address) % ADDRESS_SPACE]
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address) % ADDRESS_SPACE] = value;
    }
}
