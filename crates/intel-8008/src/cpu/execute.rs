//! Instruction execution for the 8008.

use tracing::debug;

use crate::alu::{self, AluOp, Rotation};
use crate::bus::{BusState, PinBus};
use crate::decode::{Condition, Instruction};
use crate::error::ExecError;
use crate::registers::{Operand, Reg};

use super::I8008;

impl I8008 {
    /// Dispatch a decoded instruction. The opcode fetch is already done.
    pub(super) fn execute<B: PinBus>(
        &mut self,
        bus: &mut B,
        instruction: Instruction,
        address: u16,
    ) -> Result<(), ExecError> {
        match instruction {
            Instruction::Halt(_) => self.halt(bus),
            Instruction::Unimplemented(opcode) => {
                debug!(opcode, address, "unimplemented opcode");
                return Err(ExecError::Unimplemented { opcode, address });
            }
            Instruction::Increment(r) => self.inc_dec(r, alu::inc),
            Instruction::Decrement(r) => self.inc_dec(r, alu::dec),
            Instruction::Rotate(rotation) => self.rotate(rotation),
            Instruction::Return(cond) => self.ret(bus, cond),
            Instruction::AluImmediate(op) => {
                let operand = self.read_immediate(bus);
                self.alu(op, operand);
            }
            Instruction::Restart(vector) => self.restart(bus, vector),
            Instruction::LoadImmediate(dst) => {
                let value = self.read_immediate(bus);
                self.store(bus, dst, value, false);
            }
            Instruction::Input(_) | Instruction::Output(_) => self.io(bus),
            Instruction::Jump(cond) => self.jump_call(bus, cond, false),
            Instruction::Call(cond) => self.jump_call(bus, cond, true),
            Instruction::Alu(op, src) => {
                let operand = match src {
                    Operand::Reg(r) => self.regs.get(r),
                    Operand::Memory => self.read_memory(bus),
                };
                self.transact(bus, BusState::T4, operand);
                self.alu(op, operand);
            }
            Instruction::Load { dst, src } => {
                let (value, t4_done) = match src {
                    Operand::Reg(r) => {
                        let value = self.regs.get(r);
                        self.transact(bus, BusState::T4, value);
                        (value, true)
                    }
                    Operand::Memory => (self.read_memory(bus), false),
                };
                self.store(bus, dst, value, t4_done);
            }
        }
        Ok(())
    }

    /// Write a load result to a register (T4, T5) or to memory (PCW cycle).
    fn store<B: PinBus>(&mut self, bus: &mut B, dst: Operand, value: u8, t4_done: bool) {
        match dst {
            Operand::Memory => self.write_memory(bus, value),
            Operand::Reg(r) => {
                if !t4_done {
                    self.transact(bus, BusState::T4, value);
                }
                self.regs.set(r, value);
                self.transact(bus, BusState::T5, value);
            }
        }
    }

    /// Accumulator op. Carry only changes for arithmetic and compare.
    fn alu(&mut self, op: AluOp, operand: u8) {
        let a = self.regs.a();
        let result = alu::execute(op, a, operand, self.regs.flags.carry);
        if op != AluOp::Compare {
            self.regs.set_a(result.value);
        }
        self.regs.flags.set_zsp(result.value);
        if let Some(carry) = result.carry {
            self.regs.flags.carry = carry;
        }
    }

    /// INr/DCr: zero, sign and parity follow the result; carry never does.
    fn inc_dec(&mut self, r: Reg, step: fn(u8) -> u8) {
        let value = step(self.regs.get(r));
        self.regs.set(r, value);
        self.regs.flags.set_zsp(value);
    }

    /// Rotates touch only the carry flag.
    fn rotate(&mut self, rotation: Rotation) {
        let (value, carry) = rotation.apply(self.regs.a(), self.regs.flags.carry);
        self.regs.set_a(value);
        self.regs.flags.carry = carry;
    }

    fn condition_holds(&self, cond: Option<Condition>) -> bool {
        cond.is_none_or(|c| c.holds(self.regs.flags))
    }

    /// JMP/Jc/CAL/Cc. The two address bytes follow the opcode; an untaken
    /// branch steps over them without reading them.
    fn jump_call<B: PinBus>(&mut self, bus: &mut B, cond: Option<Condition>, call: bool) {
        if !self.condition_holds(cond) {
            self.advance_pc();
            self.advance_pc();
            return;
        }

        let low = self.read_immediate(bus);
        let high = self.read_immediate(bus);
        self.transact(bus, BusState::T4, high);
        self.transact(bus, BusState::T5, low);

        let target = u16::from(high & 0x3F) << 8 | u16::from(low);
        if call {
            self.regs.stack.push(target);
        } else {
            self.regs.stack.set_pc(target);
        }
    }

    fn ret<B: PinBus>(&mut self, bus: &mut B, cond: Option<Condition>) {
        if !self.condition_holds(cond) {
            return;
        }
        self.regs.stack.pop();
        self.transact(bus, BusState::T4, 0);
        self.transact(bus, BusState::T5, 0);
    }

    /// RST: unconditional call to `vector << 3`.
    fn restart<B: PinBus>(&mut self, bus: &mut B, vector: u8) {
        let target = u16::from(vector & 0x07) << 3;
        self.regs.stack.push(target);
        self.transact(bus, BusState::T4, 0);
        self.transact(bus, BusState::T5, target as u8);
    }

    /// INP/OUT. T1 carries A, T2 carries the opcode, whose top bits are
    /// already the PCC tag and whose low bits select the port.
    fn io<B: PinBus>(&mut self, bus: &mut B) {
        let a = self.regs.a();
        let opcode = self.opcode;
        self.transact(bus, BusState::T1, a);
        self.transact(bus, BusState::T2, opcode);

        if opcode & 0x30 == 0 {
            let value = self.transact(bus, BusState::T3, 0);
            let flags = self.regs.flags.bits();
            self.transact(bus, BusState::T4, flags);
            self.regs.set_a(value);
            self.transact(bus, BusState::T5, value);
        } else {
            self.transact(bus, BusState::Wait, a);
        }
    }
}
