//! Machine bus: memory, I/O and interrupt routing.
//!
//! The CPU announces every micro-state here. The bus latches the address
//! from T1/T2, answers T3 from memory or the I/O ports, and drives the
//! interrupt line from the console.
//!
//! # I/O map
//!
//! The low three bits of the port number (`MMM`) select the device:
//!
//! | MMM | INP                                         | OUT                         |
//! |-----|---------------------------------------------|-----------------------------|
//! | 0   | status: bit 0 interrupts on, bit 1 data ready | interrupts on when A != 0 |
//! | 1   | console data (consumes it)                  | console data                |
//! | 7   | pop the external stack                      | push onto the external stack |

use std::io;

use emu_core::Bus;
use intel_8008::{AddressLatch, BusState, CycleType, InterruptLine, IoCommand, PinBus};
use tracing::debug;

use crate::console::Console;
use crate::memory::Memory;

/// `RET` with `CC = 11`. The platform treats a fetch of it as "return from
/// interrupt" and re-enables interrupts.
pub const RETI: u8 = 0x1F;

/// Value read from the console port when no byte is pending.
const NO_DATA: u8 = 0xFF;

/// Eight-entry circular byte stack on I/O selector 7.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalStack {
    slots: [u8; 8],
    top: usize,
}

impl ExternalStack {
    pub fn push(&mut self, value: u8) {
        self.slots[self.top] = value;
        self.top = (self.top + 1) % self.slots.len();
    }

    pub fn pop(&mut self) -> u8 {
        self.top = (self.top + self.slots.len() - 1) % self.slots.len();
        self.slots[self.top]
    }

    /// Index of the next free slot.
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }
}

pub struct MachineBus<C: Console> {
    pub memory: Memory,
    console: C,
    latch: AddressLatch,
    interrupt_opcode: u8,
    /// Set once the cold-boot STOPPED has been answered.
    kickstarted: bool,
    /// Console byte waiting to be read.
    pending: Option<u8>,
    /// The console reported end of input.
    input_closed: bool,
    int_enabled: bool,
    stack: ExternalStack,
    /// First console write error, surfaced after the current instruction.
    io_error: Option<io::Error>,
}

impl<C: Console> MachineBus<C> {
    #[must_use]
    pub fn new(memory: Memory, console: C, interrupt_opcode: u8) -> Self {
        Self {
            memory,
            console,
            latch: AddressLatch::default(),
            interrupt_opcode,
            kickstarted: false,
            pending: None,
            input_closed: false,
            int_enabled: false,
            stack: ExternalStack::default(),
            io_error: None,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    #[must_use]
    pub fn interrupts_enabled(&self) -> bool {
        self.int_enabled
    }

    #[must_use]
    pub fn pending_input(&self) -> Option<u8> {
        self.pending
    }

    #[must_use]
    pub fn input_closed(&self) -> bool {
        self.input_closed
    }

    #[must_use]
    pub fn external_stack(&self) -> &ExternalStack {
        &self.stack
    }

    pub(crate) fn take_io_error(&mut self) -> Option<io::Error> {
        self.io_error.take()
    }

    /// Pick up console input and raise the interrupt when it can be taken.
    fn poll_console(&mut self, int: &mut InterruptLine) {
        if self.pending.is_none() && !self.input_closed {
            self.pending = self.console.poll();
        }
        if self.pending.is_some() && self.int_enabled {
            int.request();
        }
    }

    /// T3: answer the latched cycle.
    fn data_phase(&mut self, bus_out: u8) -> u8 {
        let address = self.latch.address();
        match self.latch.cycle() {
            CycleType::Pci if self.latch.is_interrupt() => self.interrupt_opcode,
            CycleType::Pci => {
                let opcode = self.memory.read(address);
                if opcode == RETI {
                    debug!(address, "RETI: interrupts enabled");
                    self.int_enabled = true;
                }
                opcode
            }
            CycleType::Pcr => self.memory.read(address),
            CycleType::Pcw => {
                self.memory.write(address, bus_out);
                0
            }
            CycleType::Pcc => match self.latch.io() {
                Some(IoCommand::Input(port)) => self.input(port),
                _ => 0,
            },
        }
    }

    fn input(&mut self, selector: u8) -> u8 {
        let value = match selector {
            0 => u8::from(self.int_enabled) | (u8::from(self.pending.is_some()) << 1),
            1 => self.pending.take().unwrap_or(NO_DATA),
            7 => self.stack.pop(),
            _ => 0,
        };
        debug!(selector, value, "INP");
        value
    }

    fn output(&mut self, selector: u8, value: u8) {
        debug!(selector, value, "OUT");
        match selector {
            0 => self.int_enabled = value != 0,
            1 => {
                if let Err(e) = self.console.write(value) {
                    self.io_error.get_or_insert(e);
                }
            }
            7 => self.stack.push(value),
            _ => {}
        }
    }

    /// STOPPED: only an interrupt brings the CPU back.
    fn stopped(&mut self, int: &mut InterruptLine) {
        if !self.kickstarted {
            // The CPU powers up stopped; wake it straight away.
            debug!("cold boot: waking CPU");
            self.kickstarted = true;
            int.request();
            return;
        }

        if self.pending.is_none() && !self.input_closed {
            self.pending = self.console.wait();
            self.input_closed = self.pending.is_none();
        }
        if self.pending.is_some() {
            int.request();
        } else {
            debug!("console input closed while stopped");
        }
    }
}

impl<C: Console> PinBus for MachineBus<C> {
    fn transact(&mut self, state: BusState, bus_out: u8, int: &mut InterruptLine) -> u8 {
        self.poll_console(int);
        self.latch.observe(state, bus_out);

        match state {
            BusState::T1I => {
                // Acknowledge, and hold off further interrupts until RETI.
                debug!(pc = self.latch.low(), "interrupt acknowledged");
                int.set(false);
                self.int_enabled = false;
                0
            }
            BusState::T3 => self.data_phase(bus_out),
            BusState::Wait => {
                if let Some(command @ IoCommand::Output(_)) = self.latch.io() {
                    self.output(command.selector(), bus_out);
                }
                0
            }
            BusState::Stopped => {
                self.stopped(int);
                0
            }
            _ => 0,
        }
    }
}
