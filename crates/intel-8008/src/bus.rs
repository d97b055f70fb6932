//! The 8008 pin bus.
//!
//! The chip multiplexes address, data and control over eight data pins,
//! announcing each micro-state on the S0..S2 state pins. The engine models
//! this as one [`PinBus::transact`] call per state: the engine drives a
//! byte, the bus answers with a byte. T3 is the only state whose answer the
//! engine consumes.

use emu_core::Bus;
use tracing::debug;

use crate::RST_1;
use crate::registers::ADDRESS_MASK;

/// A bus micro-state, as announced on the S0..S2 pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusState {
    /// Output strobe for OUT.
    Wait,
    /// Data phase.
    T3,
    /// Low address byte.
    T1,
    /// Halted, waiting for an interrupt.
    Stopped,
    /// High address bits plus the cycle type.
    T2,
    T5,
    /// Low address byte of an interrupt-acknowledge fetch.
    T1I,
    T4,
}

impl BusState {
    /// The S2 S1 S0 pin encoding.
    #[must_use]
    pub const fn pins(self) -> u8 {
        match self {
            BusState::Wait => 0,
            BusState::T3 => 1,
            BusState::T1 => 2,
            BusState::Stopped => 3,
            BusState::T2 => 4,
            BusState::T5 => 5,
            BusState::T1I => 6,
            BusState::T4 => 7,
        }
    }

    #[must_use]
    pub const fn from_pins(pins: u8) -> Self {
        match pins & 0b111 {
            0 => BusState::Wait,
            1 => BusState::T3,
            2 => BusState::T1,
            3 => BusState::Stopped,
            4 => BusState::T2,
            5 => BusState::T5,
            6 => BusState::T1I,
            _ => BusState::T4,
        }
    }
}

/// Cycle type, driven on data bits 7..6 during T2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CycleType {
    /// Instruction fetch.
    #[default]
    Pci,
    /// Data read.
    Pcr,
    /// I/O command.
    Pcc,
    /// Data write.
    Pcw,
}

impl CycleType {
    pub const MASK: u8 = 0xC0;

    /// The T2 tag bits for this cycle type.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            CycleType::Pci => 0x00,
            CycleType::Pcc => 0x40,
            CycleType::Pcr => 0x80,
            CycleType::Pcw => 0xC0,
        }
    }

    /// Extract the cycle type from a T2 byte.
    #[must_use]
    pub const fn from_t2(byte: u8) -> Self {
        match byte & Self::MASK {
            0x00 => CycleType::Pci,
            0x40 => CycleType::Pcc,
            0x80 => CycleType::Pcr,
            _ => CycleType::Pcw,
        }
    }
}

/// The INTERRUPT input, as seen by whoever drives the bus.
///
/// The engine hands a mutable reference to its latch into every
/// transaction, so a bus may raise or acknowledge an interrupt from inside
/// any state, including STOPPED.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptLine {
    requested: bool,
}

impl InterruptLine {
    pub fn request(&mut self) {
        self.requested = true;
    }

    pub fn set(&mut self, requested: bool) {
        self.requested = requested;
    }

    #[must_use]
    pub const fn is_requested(&self) -> bool {
        self.requested
    }

    /// Clear the request, returning whether one was pending.
    pub fn acknowledge(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

/// The world outside the 8008.
///
/// `state` names the micro-state, `bus_out` is the byte the CPU drives, and
/// the return value is what the outside world drives back. Only T3 answers
/// are used by the engine.
///
/// On `T1I` the bus must not start a real memory read; it answers the
/// following T3 with an opcode of its own choosing. On `Stopped` it may
/// block until it is ready to raise `int`.
pub trait PinBus {
    fn transact(&mut self, state: BusState, bus_out: u8, int: &mut InterruptLine) -> u8;
}

impl<F> PinBus for F
where
    F: FnMut(BusState, u8, &mut InterruptLine) -> u8,
{
    fn transact(&mut self, state: BusState, bus_out: u8, int: &mut InterruptLine) -> u8 {
        self(state, bus_out, int)
    }
}

/// A decoded PCC cycle: the T2 byte of an I/O cycle is the opcode itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoCommand {
    /// INP, port 0..=7.
    Input(u8),
    /// OUT, port 8..=31.
    Output(u8),
}

impl IoCommand {
    #[must_use]
    pub const fn from_t2(byte: u8) -> Self {
        if byte & 0x30 == 0 {
            IoCommand::Input((byte >> 1) & 0x07)
        } else {
            IoCommand::Output((byte >> 1) & 0x1F)
        }
    }

    /// The `MMM` sub-selector, bits 3..1 of the opcode.
    #[must_use]
    pub const fn selector(self) -> u8 {
        match self {
            IoCommand::Input(port) | IoCommand::Output(port) => port & 0x07,
        }
    }
}

/// Reassembles the address and cycle type from T1 and T2.
///
/// Every platform needs this, since the engine only ever hands out one
/// byte per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressLatch {
    low: u8,
    t2: u8,
    interrupt: bool,
}

impl AddressLatch {
    /// Feed a transaction. Only T1, T1I and T2 change the latch.
    pub fn observe(&mut self, state: BusState, bus_out: u8) {
        match state {
            BusState::T1 => {
                self.low = bus_out;
                self.interrupt = false;
            }
            BusState::T1I => {
                self.low = bus_out;
                self.interrupt = true;
            }
            BusState::T2 => self.t2 = bus_out,
            _ => {}
        }
    }

    #[must_use]
    pub const fn address(&self) -> u16 {
        ((self.high() as u16) << 8 | self.low as u16) & ADDRESS_MASK
    }

    #[must_use]
    pub const fn low(&self) -> u8 {
        self.low
    }

    /// T2 byte without the cycle type tag.
    #[must_use]
    pub const fn high(&self) -> u8 {
        self.t2 & !CycleType::MASK
    }

    #[must_use]
    pub const fn cycle(&self) -> CycleType {
        CycleType::from_t2(self.t2)
    }

    /// The I/O command, if the latched cycle is PCC.
    #[must_use]
    pub const fn io(&self) -> Option<IoCommand> {
        match self.cycle() {
            CycleType::Pcc => Some(IoCommand::from_t2(self.t2)),
            _ => None,
        }
    }

    /// True if the latched cycle began with T1I.
    #[must_use]
    pub const fn is_interrupt(&self) -> bool {
        self.interrupt
    }
}

/// A plain memory platform: routes PCI/PCR/PCW cycles to a [`Bus`],
/// serves INP from a port table, records OUT, and jams a fixed opcode on
/// interrupt fetches.
pub struct MemoryPins<M: Bus> {
    memory: M,
    latch: AddressLatch,
    jam: u8,
    inputs: [u8; 8],
    outputs: Vec<(u8, u8)>,
    wake_on_stop: bool,
    stops: u32,
}

impl<M: Bus> MemoryPins<M> {
    /// Wrap `memory`. Interrupt fetches jam RST 1; STOPPED does not wake.
    pub fn new(memory: M) -> Self {
        Self {
            memory,
            latch: AddressLatch::default(),
            jam: RST_1,
            inputs: [0; 8],
            outputs: Vec::new(),
            wake_on_stop: false,
            stops: 0,
        }
    }

    /// Opcode supplied on interrupt fetches.
    #[must_use]
    pub fn with_jam(mut self, opcode: u8) -> Self {
        self.jam = opcode;
        self
    }

    /// Raise an interrupt whenever the CPU enters STOPPED.
    #[must_use]
    pub fn wake_on_stop(mut self, wake: bool) -> Self {
        self.wake_on_stop = wake;
        self
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn set_input(&mut self, port: u8, value: u8) {
        self.inputs[usize::from(port & 0x07)] = value;
    }

    /// `(port, value)` pairs written by OUT, oldest first.
    #[must_use]
    pub fn outputs(&self) -> &[(u8, u8)] {
        &self.outputs
    }

    /// Number of STOPPED transactions seen.
    #[must_use]
    pub fn stops(&self) -> u32 {
        self.stops
    }
}

impl<M: Bus> PinBus for MemoryPins<M> {
    fn transact(&mut self, state: BusState, bus_out: u8, int: &mut InterruptLine) -> u8 {
        self.latch.observe(state, bus_out);
        match state {
            BusState::T3 => match self.latch.cycle() {
                CycleType::Pci if self.latch.is_interrupt() => self.jam,
                CycleType::Pci | CycleType::Pcr => self.memory.read(self.latch.address()),
                CycleType::Pcw => {
                    self.memory.write(self.latch.address(), bus_out);
                    0
                }
                CycleType::Pcc => match IoCommand::from_t2(self.latch.t2) {
                    IoCommand::Input(port) => self.inputs[usize::from(port)],
                    IoCommand::Output(_) => 0,
                },
            },
            BusState::Wait => {
                if let Some(IoCommand::Output(port)) = self.latch.io() {
                    self.outputs.push((port, bus_out));
                }
                0
            }
            BusState::Stopped => {
                self.stops += 1;
                if self.wake_on_stop {
                    debug!("memory pins: waking CPU from STOPPED");
                    int.request();
                }
                0
            }
            _ => 0,
        }
    }
}

/// One recorded bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    pub state: BusState,
    pub bus_out: u8,
    pub bus_in: u8,
}

/// Wraps another bus and records every transaction passing through it.
pub struct Recorder<B> {
    inner: B,
    log: Vec<Transaction>,
}

impl<B: PinBus> Recorder<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            log: Vec::new(),
        }
    }

    #[must_use]
    pub fn log(&self) -> &[Transaction] {
        &self.log
    }

    /// The states of the recorded transactions, in order.
    #[must_use]
    pub fn states(&self) -> Vec<BusState> {
        self.log.iter().map(|t| t.state).collect()
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }
}

impl<B: PinBus> PinBus for Recorder<B> {
    fn transact(&mut self, state: BusState, bus_out: u8, int: &mut InterruptLine) -> u8 {
        let bus_in = self.inner.transact(state, bus_out, int);
        self.log.push(Transaction {
            state,
            bus_out,
            bus_in,
        });
        bus_in
    }
}
