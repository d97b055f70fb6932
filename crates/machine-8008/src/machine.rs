//! Top-level 8008 system: the CPU plus the machine bus.

use emu_core::{Cpu, Observable, Value};
use intel_8008::{I8008, Reg, Step, disasm};
use tracing::info;

use crate::bus::MachineBus;
use crate::config::MachineConfig;
use crate::console::Console;
use crate::error::MachineError;
use crate::memory::Memory;

/// Why [`Machine::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The CPU is stopped and the console has no more input to wake it.
    InputClosed,
    /// The requested number of instruction cycles ran.
    CycleLimit,
}

/// The reference 8008 platform.
pub struct Machine<C: Console> {
    cpu: I8008,
    bus: MachineBus<C>,
    /// Instruction cycles run, including stopped ones.
    cycles: u64,
}

impl<C: Console> Machine<C> {
    /// Build the machine and power the CPU up. The CPU starts stopped; the
    /// bus wakes it on the first cycle.
    pub fn new(config: &MachineConfig, console: C) -> Result<Self, MachineError> {
        let memory = Memory::new(config)?;
        let mut bus = MachineBus::new(memory, console, config.interrupt_opcode);
        let cpu = I8008::new(&mut bus);
        Ok(Self {
            cpu,
            bus,
            cycles: 0,
        })
    }

    /// Run one instruction cycle.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        let step = self.cpu.cycle(&mut self.bus)?;
        self.cycles += 1;
        if let Some(e) = self.bus.take_io_error() {
            return Err(MachineError::Console(e));
        }
        Ok(step)
    }

    /// Run until the console runs dry, `max_cycles` cycles pass, or the CPU
    /// faults. With `trace`, each instruction is logged on target `trace`
    /// before it runs.
    pub fn run(&mut self, max_cycles: Option<u64>, trace: bool) -> Result<RunOutcome, MachineError> {
        let start = self.cycles;
        loop {
            if max_cycles.is_some_and(|max| self.cycles - start >= max) {
                return Ok(RunOutcome::CycleLimit);
            }
            if trace && !self.cpu.is_halted() {
                self.trace_line();
            }
            if self.step()? == Step::Stopped && self.bus.input_closed() {
                info!(cycles = self.cycles, "console closed; stopping");
                return Ok(RunOutcome::InputClosed);
            }
        }
    }

    /// PC, opcode, A, H, L and the disassembly at PC.
    fn trace_line(&self) {
        let pc = self.cpu.stack().pc();
        let bytes = [0, 1, 2].map(|offset| self.bus.memory.peek(pc.wrapping_add(offset)));
        let line = disasm::disassemble_one(&bytes, pc);
        info!(
            target: "trace",
            "PC={pc:04X} op={:02X} A={:02X} H={:02X} L={:02X}   {line}",
            bytes[0],
            self.cpu.reg(Reg::A),
            self.cpu.reg(Reg::H),
            self.cpu.reg(Reg::L),
        );
    }

    #[must_use]
    pub fn cpu(&self) -> &I8008 {
        &self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &MachineBus<C> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MachineBus<C> {
        &mut self.bus
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.bus.memory
    }

    #[must_use]
    pub fn console(&self) -> &C {
        self.bus.console()
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl<C: Console> Observable for Machine<C> {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let address = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            address.map(|a| Value::U8(self.bus.memory.peek(a)))
        } else {
            match path {
                "cycles" => Some(self.cycles.into()),
                "io.int_enabled" => Some(self.bus.interrupts_enabled().into()),
                "io.pending" => Some(self.bus.pending_input().is_some().into()),
                "io.input_closed" => Some(self.bus.input_closed().into()),
                "io.stack_top" => Some((self.bus.external_stack().top() as u8).into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<8008_paths>",
            "memory.<address>",
            "cycles",
            "io.int_enabled",
            "io.pending",
            "io.input_closed",
            "io.stack_top",
        ]
    }
}
