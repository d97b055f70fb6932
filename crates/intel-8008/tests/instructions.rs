//! Unit tests for individual 8008 instructions.
//!
//! Each test loads a short program into flat memory, wakes the CPU at a
//! known address and runs whole instruction cycles.

use emu_core::{Cpu, SimpleBus};
use intel_8008::{
    BusState, ExecError, Flags, I8008, Instruction, MemoryPins, Recorder, Reg, Rotation, Step,
};

/// Load `program` at `origin` and return a running CPU with PC there.
fn setup(origin: u16, program: &[u8]) -> (I8008, MemoryPins<SimpleBus>) {
    let mut bus = MemoryPins::new(SimpleBus::new());
    bus.memory_mut().load(origin, program);
    let mut cpu = I8008::new(&mut bus);
    cpu.wake();
    cpu.set_pc(origin);
    (cpu, bus)
}

/// Run `count` instruction cycles, panicking on any engine error.
fn run(cpu: &mut I8008, bus: &mut MemoryPins<SimpleBus>, count: usize) {
    for _ in 0..count {
        cpu.cycle(bus).expect("instruction should execute");
    }
}

#[test]
fn test_add_immediate_with_carry_out() {
    // LAI 0xF0; ADI 0x20
    let (mut cpu, mut bus) = setup(0x0100, &[0x06, 0xF0, 0x04, 0x20]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.reg(Reg::A), 0x10);
    assert!(cpu.flags().carry);
    assert!(!cpu.flags().zero);
    assert!(!cpu.flags().sign);
    assert!(!cpu.flags().parity, "0x10 has one bit set");
    assert_eq!(cpu.pc(), 0x0104);
}

#[test]
fn test_increment_never_touches_carry() {
    // LBI 0xFF; INB
    let (mut cpu, mut bus) = setup(0x0000, &[0x0E, 0xFF, 0x08]);
    cpu.set_flags(Flags {
        carry: true,
        ..Flags::default()
    });
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.reg(Reg::B), 0x00);
    assert!(cpu.flags().zero);
    assert!(cpu.flags().parity);
    assert!(cpu.flags().carry, "INr must leave carry set");
}

#[test]
fn test_decrement_never_touches_carry() {
    // DCC with C = 0
    let (mut cpu, mut bus) = setup(0x0000, &[0x11]);
    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.reg(Reg::C), 0xFF);
    assert!(cpu.flags().sign);
    assert!(cpu.flags().parity);
    assert!(!cpu.flags().zero);
    assert!(!cpu.flags().carry, "DCr must not borrow into carry");
}

#[test]
fn test_untaken_jump_skips_address_bytes() {
    // JTZ 0x1234 with zero clear
    let (mut cpu, mut bus) = setup(0x0200, &[0x68, 0x34, 0x12]);
    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.pc(), 0x0203);
    assert_eq!(cpu.stack().index(), 0);
}

#[test]
fn test_taken_jump_masks_to_14_bits() {
    // JMP 0xFF34 -> 0x3F34
    let (mut cpu, mut bus) = setup(0x0000, &[0x44, 0x34, 0xFF]);
    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.pc(), 0x3F34);
    assert_eq!(cpu.stack().index(), 0);
}

#[test]
fn test_conditional_jump_on_each_flag() {
    // JTC, JTZ, JTS, JTP, each taken when its flag is set
    for (opcode, flags) in [
        (0x60, Flags { carry: true, ..Flags::default() }),
        (0x68, Flags { zero: true, ..Flags::default() }),
        (0x70, Flags { sign: true, ..Flags::default() }),
        (0x78, Flags { parity: true, ..Flags::default() }),
    ] {
        let (mut cpu, mut bus) = setup(0x0000, &[opcode, 0x00, 0x01]);
        cpu.set_flags(flags);
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.pc(), 0x0100, "opcode {opcode:#04X} should jump");

        // JFc is the same opcode with bit 5 clear
        let (mut cpu, mut bus) = setup(0x0000, &[opcode & !0x20, 0x00, 0x01]);
        cpu.set_flags(flags);
        run(&mut cpu, &mut bus, 1);
        assert_eq!(cpu.pc(), 0x0003, "opcode {:#04X} should fall through", opcode & !0x20);
    }
}

#[test]
fn test_call_and_return() {
    let mut program = vec![0u8; 0x20];
    // 0x00: CAL 0x0010; LAI 0x99
    program[0x00..0x05].copy_from_slice(&[0x46, 0x10, 0x00, 0x06, 0x99]);
    // 0x10: LBI 0x42; RET
    program[0x10..0x13].copy_from_slice(&[0x0E, 0x42, 0x07]);
    let (mut cpu, mut bus) = setup(0x0000, &program);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.pc(), 0x0010);
    assert_eq!(cpu.stack().index(), 1);
    assert_eq!(cpu.stack().slot(0), 0x0003);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.reg(Reg::B), 0x42);
    assert_eq!(cpu.reg(Reg::A), 0x99);
    assert_eq!(cpu.stack().index(), 0);
    assert_eq!(cpu.pc(), 0x0005);
}

#[test]
fn test_conditional_return_not_taken() {
    // RTZ with zero clear, then LAI 1
    let (mut cpu, mut bus) = setup(0x0000, &[0x2B, 0x06, 0x01]);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.stack().index(), 0);
    assert_eq!(cpu.reg(Reg::A), 0x01);
}

#[test]
fn test_conditional_call_not_taken() {
    // CTC 0x0100 with carry clear
    let (mut cpu, mut bus) = setup(0x0000, &[0x62, 0x00, 0x01]);
    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.stack().index(), 0);
    assert_eq!(cpu.pc(), 0x0003);
}

#[test]
fn test_call_stack_wraps_after_eight_levels() {
    // Chain of calls: 0x10*k: CAL 0x10*(k+1)
    let mut program = vec![0u8; 0xA0];
    for k in 0..9u8 {
        let at = usize::from(k) * 0x10;
        program[at..at + 3].copy_from_slice(&[0x46, (k + 1) * 0x10, 0x00]);
    }
    let (mut cpu, mut bus) = setup(0x0000, &program);

    run(&mut cpu, &mut bus, 8);
    assert_eq!(cpu.stack().index(), 0, "eight pushes wrap the index to 0");
    assert_eq!(cpu.pc(), 0x0080);
    assert_eq!(cpu.stack().slot(0), 0x0080, "original PC slot overwritten");

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.stack().index(), 1);
    assert_eq!(cpu.stack().slot(0), 0x0083);
    assert_eq!(cpu.pc(), 0x0090, "ninth call overwrites the oldest return");
}

#[test]
fn test_restart_pushes_vector() {
    // RST 7 at 0x0123
    let (mut cpu, mut bus) = setup(0x0123, &[0x3D]);
    run(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.pc(), 0x0038);
    assert_eq!(cpu.stack().index(), 1);
    assert_eq!(cpu.stack().slot(0), 0x0124);
}

#[test]
fn test_halt_alias_load_memory_memory() {
    // LHI 0x01; LLI 0x00; LMM
    let (mut cpu, mut bus) = setup(0x0000, &[0x2E, 0x01, 0x36, 0x00, 0xFF]);
    bus.memory_mut().load(0x0100, &[0x5A]);
    run(&mut cpu, &mut bus, 2);

    let mut bus = Recorder::new(bus);
    let step = cpu.cycle(&mut bus).expect("halt is not an error");
    assert_eq!(step, Step::Executed(Instruction::Halt(0xFF)));
    assert_eq!(
        bus.states(),
        vec![BusState::T1, BusState::T2, BusState::T3, BusState::Stopped],
        "no memory cycle after the fetch"
    );

    assert!(cpu.is_halted());
    assert_eq!(bus.inner().stops(), 2, "boot plus HLT");
    assert_eq!(bus.inner().memory().peek(0x0100), 0x5A);
    assert_eq!(cpu.pc(), 0x0005);
}

#[test]
fn test_halt_alias_increment_accumulator() {
    for opcode in [0x00, 0x01] {
        let (mut cpu, mut bus) = setup(0x0000, &[opcode]);
        let step = cpu.cycle(&mut bus).expect("halt is not an error");
        assert_eq!(step, Step::Executed(Instruction::Halt(opcode)));
        assert!(cpu.is_halted());
        assert_eq!(cpu.reg(Reg::A), 0, "INA/DCA encodings must not touch A");
    }
}

#[test]
fn test_unimplemented_increment_memory() {
    // LAI 5; INM
    let (mut cpu, mut bus) = setup(0x0040, &[0x06, 0x05, 0x38]);
    run(&mut cpu, &mut bus, 1);

    let err = cpu.cycle(&mut bus).expect_err("INM must not execute");
    assert_eq!(
        err,
        ExecError::Unimplemented {
            opcode: 0x38,
            address: 0x0042
        }
    );
    assert_eq!(cpu.reg(Reg::A), 0x05);
    assert_eq!(cpu.flags(), Flags::default());
    assert_eq!(cpu.pc(), 0x0043);
    assert!(!cpu.in_interrupt_cycle());
}

#[test]
fn test_load_register_memory_paths() {
    // LHI 0x02; LLI 0x10; LBI 0x77; LMB; LAM; LCA
    let program = [0x2E, 0x02, 0x36, 0x10, 0x0E, 0x77, 0xF9, 0xC7, 0xD0];
    let (mut cpu, mut bus) = setup(0x0000, &program);
    run(&mut cpu, &mut bus, 6);

    assert_eq!(bus.memory().peek(0x0210), 0x77);
    assert_eq!(cpu.reg(Reg::A), 0x77);
    assert_eq!(cpu.reg(Reg::C), 0x77);
    assert_eq!(cpu.flags(), Flags::default(), "loads never touch flags");
}

#[test]
fn test_load_immediate_to_memory() {
    // LHI 0x03; LLI 0x00; LMI 0xAB
    let (mut cpu, mut bus) = setup(0x0000, &[0x2E, 0x03, 0x36, 0x00, 0x3E, 0xAB]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(bus.memory().peek(0x0300), 0xAB);
    assert_eq!(cpu.pc(), 0x0006);
}

#[test]
fn test_alu_memory_operand() {
    // LHI 0x01; LLI 0x00; LAI 0x01; ADM
    let (mut cpu, mut bus) = setup(0x0000, &[0x2E, 0x01, 0x36, 0x00, 0x06, 0x01, 0x87]);
    bus.memory_mut().load(0x0100, &[0x7F]);
    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.reg(Reg::A), 0x80);
    assert!(cpu.flags().sign);
    assert!(!cpu.flags().carry);
}

#[test]
fn test_compare_keeps_accumulator() {
    // LAI 0x10; CPI 0x20; then LAI 0x20; CPI 0x20
    let (mut cpu, mut bus) = setup(0x0000, &[0x06, 0x10, 0x3C, 0x20, 0x06, 0x20, 0x3C, 0x20]);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg(Reg::A), 0x10);
    assert!(cpu.flags().carry, "A < operand borrows");
    assert!(!cpu.flags().zero);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg(Reg::A), 0x20);
    assert!(cpu.flags().zero);
    assert!(!cpu.flags().carry);
}

#[test]
fn test_logic_ops_leave_carry() {
    // LAI 0xF0; NDI 0x0F (carry preset)
    let (mut cpu, mut bus) = setup(0x0000, &[0x06, 0xF0, 0x24, 0x0F]);
    cpu.set_flags(Flags {
        carry: true,
        ..Flags::default()
    });
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.reg(Reg::A), 0x00);
    assert!(cpu.flags().zero);
    assert!(cpu.flags().carry);
}

#[test]
fn test_rotates_touch_only_carry() {
    // LAI 0x81; RLC; RRC; RAL; RAR
    let (mut cpu, mut bus) = setup(0x0000, &[0x06, 0x81, 0x02, 0x0A, 0x12, 0x1A]);
    let preset = Flags {
        zero: true,
        sign: false,
        parity: true,
        carry: false,
    };
    cpu.set_flags(preset);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.reg(Reg::A), 0x03);
    assert!(cpu.flags().carry);

    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.reg(Reg::A), 0x81);
    assert!(cpu.flags().carry);

    // RAL: 0x81 with carry in -> 0x03, carry out 1
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.reg(Reg::A), 0x03);
    assert!(cpu.flags().carry);

    // RAR: 0x03 with carry in -> 0x81, carry out 1
    run(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.reg(Reg::A), 0x81);
    assert!(cpu.flags().carry);

    let flags = cpu.flags();
    assert_eq!(
        (flags.zero, flags.sign, flags.parity),
        (preset.zero, preset.sign, preset.parity)
    );
}

#[test]
fn test_upper_rotate_encodings_change_nothing() {
    for opcode in [0x22, 0x2A, 0x32, 0x3A] {
        assert!(matches!(
            Instruction::decode(opcode),
            Instruction::Rotate(Rotation::Inert(_))
        ));
        for carry in [false, true] {
            // LAI 0x81; <opcode>
            let (mut cpu, mut bus) = setup(0x0000, &[0x06, 0x81, opcode]);
            cpu.set_flags(Flags {
                carry,
                ..Flags::default()
            });
            run(&mut cpu, &mut bus, 2);

            assert_eq!(cpu.reg(Reg::A), 0x81, "opcode {opcode:#04X}");
            assert_eq!(cpu.flags().carry, carry, "opcode {opcode:#04X}");
            assert_eq!(cpu.pc(), 0x0003);
        }
    }
}

#[test]
fn test_input_and_output() {
    // INP 3; OUT 8
    let (mut cpu, mut bus) = setup(0x0000, &[0x47, 0x51]);
    bus.set_input(3, 0x5C);
    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.reg(Reg::A), 0x5C);
    assert_eq!(bus.outputs(), &[(8, 0x5C)]);
    assert_eq!(cpu.flags(), Flags::default(), "INP does not load flags");
}

#[test]
fn test_interrupt_fetch_keeps_pc() {
    let (mut cpu, mut bus) = setup(0x0123, &[0xC0]);
    cpu.request_interrupt();
    let step = cpu.cycle(&mut bus).expect("jammed RST executes");

    assert_eq!(step, Step::Executed(Instruction::Restart(1)));
    assert_eq!(cpu.pc(), 0x0008);
    assert_eq!(cpu.stack().index(), 1);
    assert_eq!(cpu.stack().slot(0), 0x0123, "interrupted PC not advanced");
    assert!(!cpu.interrupt_requested(), "request acknowledged");
    assert!(!cpu.in_interrupt_cycle());
}

#[test]
fn test_cold_boot_through_interrupt() {
    let mut bus = MemoryPins::new(SimpleBus::new()).wake_on_stop(true);
    // Vector 1: LAI 0x2A; HLT
    bus.memory_mut().load(0x0008, &[0x06, 0x2A, 0x00]);
    let mut cpu = I8008::new(&mut bus);
    assert!(cpu.is_halted());
    assert!(cpu.interrupt_requested());

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.reg(Reg::A), 0x2A);
    assert!(cpu.is_halted());
    assert_eq!(cpu.stack().slot(0), 0x0000);
}

#[test]
fn test_halt_resumes_after_interrupt() {
    // HLT at 0; vector 1: LBI 0x11; RET
    let (mut cpu, mut bus) = setup(0x0000, &[0xFF]);
    bus.memory_mut().load(0x0008, &[0x0E, 0x11, 0x07]);
    run(&mut cpu, &mut bus, 1);
    assert!(cpu.is_halted());

    assert_eq!(cpu.cycle(&mut bus), Ok(Step::Stopped));
    cpu.request_interrupt();
    run(&mut cpu, &mut bus, 3);

    assert!(!cpu.is_halted());
    assert_eq!(cpu.reg(Reg::B), 0x11);
    assert_eq!(cpu.pc(), 0x0001, "RET lands after the HLT");
}
