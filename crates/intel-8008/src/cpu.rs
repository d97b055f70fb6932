//! 8008 CPU core with per-instruction execution.

use emu_core::{Cpu, Observable, Ticks, Value};
use tracing::{debug, trace};

use crate::bus::{BusState, CycleType, InterruptLine, PinBus};
use crate::decode::Instruction;
use crate::error::ExecError;
use crate::flags::Flags;
use crate::registers::{ADDRESS_MASK, AddressStack, Reg, Registers};

mod execute;

/// Whether the CPU is executing or parked in STOPPED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Stopped,
}

/// What a call to [`I8008::cycle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// An instruction ran to completion. A HLT leaves the CPU stopped.
    Executed(Instruction),
    /// The CPU is stopped and the bus did not raise an interrupt during the
    /// STOPPED transaction.
    Stopped,
}

/// Intel 8008 CPU.
///
/// The CPU does not own the bus. Instead, the bus is passed to `cycle()`,
/// and every micro-state of the instruction is one call into it. The
/// interrupt latch is handed to the bus on each call so the bus can raise
/// it mid-instruction.
pub struct I8008 {
    /// Register file, flags and address stack.
    pub(crate) regs: Registers,
    /// Pending interrupt request.
    int_line: InterruptLine,
    /// True while the current cycle is an interrupt-acknowledge cycle.
    int_cycle: bool,
    state: RunState,
    /// Opcode of the instruction being (or last) executed.
    opcode: u8,
    /// Total bus states driven.
    total_states: Ticks,
}

impl I8008 {
    /// Create a zeroed 8008 and put it through the cold-boot halt.
    ///
    /// The chip powers up in STOPPED, so construction already drives one
    /// STOPPED transaction. A bus that wants the CPU to start running should
    /// raise the interrupt then.
    pub fn new<B: PinBus>(bus: &mut B) -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            int_line: InterruptLine::default(),
            int_cycle: false,
            state: RunState::Running,
            opcode: 0,
            total_states: Ticks::ZERO,
        };
        cpu.halt(bus);
        cpu
    }

    /// Run one fetch/decode/execute cycle.
    ///
    /// While stopped, this drives a STOPPED transaction and returns
    /// [`Step::Stopped`] unless the bus raised the interrupt, in which case
    /// the CPU resumes with an interrupt fetch.
    pub fn cycle<B: PinBus>(&mut self, bus: &mut B) -> Result<Step, ExecError> {
        if self.state == RunState::Stopped {
            if !self.int_line.is_requested() {
                self.transact(bus, BusState::Stopped, 0);
                if !self.int_line.is_requested() {
                    return Ok(Step::Stopped);
                }
            }
            debug!(pc = self.regs.pc(), "interrupt wakes CPU from STOPPED");
            self.state = RunState::Running;
        }

        self.int_cycle = self.int_line.acknowledge();
        let address = self.regs.pc();
        self.opcode = self.fetch_opcode(bus, address);
        self.advance_pc();

        let instruction = Instruction::decode(self.opcode);
        trace!(
            pc = address,
            opcode = self.opcode,
            interrupt = self.int_cycle,
            "{instruction}"
        );
        let result = self.execute(bus, instruction, address);
        self.int_cycle = false;
        result.map(|()| Step::Executed(instruction))
    }

    /// Raise the interrupt request. It is acknowledged by the next cycle.
    pub fn request_interrupt(&mut self) {
        self.int_line.request();
    }

    #[must_use]
    pub const fn interrupt_requested(&self) -> bool {
        self.int_line.is_requested()
    }

    /// True while the current cycle was forced by an interrupt.
    #[must_use]
    pub const fn in_interrupt_cycle(&self) -> bool {
        self.int_cycle
    }

    #[must_use]
    pub const fn reg(&self, r: Reg) -> u8 {
        self.regs.get(r)
    }

    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.regs.flags
    }

    #[must_use]
    pub const fn stack(&self) -> &AddressStack {
        &self.regs.stack
    }

    /// Opcode of the most recent instruction.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Total bus states driven since construction.
    #[must_use]
    pub const fn total_states(&self) -> Ticks {
        self.total_states
    }

    /// Set the program counter.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn set_pc(&mut self, value: u16) {
        self.regs.stack.set_pc(value);
    }

    /// Set a register.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn set_reg(&mut self, r: Reg, value: u8) {
        self.regs.set(r, value);
    }

    /// Set all four flags.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn set_flags(&mut self, flags: Flags) {
        self.regs.flags = flags;
    }

    /// Leave STOPPED without an interrupt cycle.
    ///
    /// Only available in test builds.
    #[cfg(feature = "test-utils")]
    pub fn wake(&mut self) {
        self.state = RunState::Running;
    }

    // =========================================================================
    // Bus cycles
    // =========================================================================

    /// One bus transaction.
    fn transact<B: PinBus>(&mut self, bus: &mut B, state: BusState, bus_out: u8) -> u8 {
        self.total_states.step();
        bus.transact(state, bus_out, &mut self.int_line)
    }

    /// T1/T1I, T2 with the cycle type, T3 returning the data.
    fn read<B: PinBus>(&mut self, bus: &mut B, first: BusState, address: u16, cycle: CycleType) -> u8 {
        let address = address & ADDRESS_MASK;
        self.transact(bus, first, address as u8);
        self.transact(bus, BusState::T2, (address >> 8) as u8 | cycle.tag());
        self.transact(bus, BusState::T3, 0)
    }

    fn fetch_opcode<B: PinBus>(&mut self, bus: &mut B, address: u16) -> u8 {
        let first = if self.int_cycle {
            BusState::T1I
        } else {
            BusState::T1
        };
        self.read(bus, first, address, CycleType::Pci)
    }

    /// Read the byte at PC as data and step past it.
    fn read_immediate<B: PinBus>(&mut self, bus: &mut B) -> u8 {
        let value = self.read(bus, BusState::T1, self.regs.pc(), CycleType::Pcr);
        self.advance_pc();
        value
    }

    fn read_memory<B: PinBus>(&mut self, bus: &mut B) -> u8 {
        self.read(bus, BusState::T1, self.regs.hl(), CycleType::Pcr)
    }

    fn write_memory<B: PinBus>(&mut self, bus: &mut B, value: u8) {
        let address = self.regs.hl();
        self.transact(bus, BusState::T1, address as u8);
        self.transact(bus, BusState::T2, (address >> 8) as u8 | CycleType::Pcw.tag());
        self.transact(bus, BusState::T3, value);
    }

    /// PC increments are suppressed during an interrupt cycle: the jammed
    /// opcode never came from memory.
    fn advance_pc(&mut self) {
        if !self.int_cycle {
            self.regs.stack.advance_pc();
        }
    }

    /// Enter STOPPED.
    fn halt<B: PinBus>(&mut self, bus: &mut B) {
        debug!(pc = self.regs.pc(), "CPU enters STOPPED");
        self.state = RunState::Stopped;
        self.transact(bus, BusState::Stopped, 0);
    }
}

impl Cpu for I8008 {
    type Registers = Registers;

    fn pc(&self) -> u32 {
        u32::from(self.regs.pc())
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.state == RunState::Stopped
    }

    fn interrupt(&mut self) -> bool {
        self.int_line.request();
        true
    }
}

/// All query paths supported by the 8008.
const I8008_QUERY_PATHS: &[&str] = &[
    // Registers
    "a", "b", "c", "d", "e", "h", "l", "hl",
    // Address stack
    "pc", "sp", "stack",
    "stack.0", "stack.1", "stack.2", "stack.3",
    "stack.4", "stack.5", "stack.6", "stack.7",
    // Flags
    "flags", "flags.c", "flags.z", "flags.s", "flags.p",
    // CPU state
    "halted", "int_req", "opcode", "states",
];

impl Observable for I8008 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(slot) = path.strip_prefix("stack.") {
            let index: usize = slot.parse().ok()?;
            return (index < AddressStack::DEPTH).then(|| self.regs.stack.slot(index).into());
        }
        match path {
            "a" => Some(self.regs.get(Reg::A).into()),
            "b" => Some(self.regs.get(Reg::B).into()),
            "c" => Some(self.regs.get(Reg::C).into()),
            "d" => Some(self.regs.get(Reg::D).into()),
            "e" => Some(self.regs.get(Reg::E).into()),
            "h" => Some(self.regs.get(Reg::H).into()),
            "l" => Some(self.regs.get(Reg::L).into()),
            "hl" => Some(self.regs.hl().into()),

            "pc" => Some(self.regs.pc().into()),
            "sp" => Some(self.regs.stack.index().into()),
            "stack" => Some(self.regs.stack.slots().to_vec().into()),

            "flags" => Some(self.regs.flags.bits().into()),
            "flags.c" => Some(self.regs.flags.carry.into()),
            "flags.z" => Some(self.regs.flags.zero.into()),
            "flags.s" => Some(self.regs.flags.sign.into()),
            "flags.p" => Some(self.regs.flags.parity.into()),

            "halted" => Some((self.state == RunState::Stopped).into()),
            "int_req" => Some(self.int_line.is_requested().into()),
            "opcode" => Some(self.opcode.into()),
            "states" => Some(self.total_states.get().into()),

            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        I8008_QUERY_PATHS
    }
}
