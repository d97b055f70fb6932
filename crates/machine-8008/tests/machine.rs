//! Whole-machine tests: assembled programs running against a scripted
//! console.

use emu_core::{Observable, Value};
use intel_8008::{ExecError, Reg};
use intel_8008_asm::assemble;
use machine_8008::{Machine, MachineConfig, MachineError, RunOutcome, ScriptedConsole};

/// Cold boot jams RST 1, so programs start at 0x08.
const ECHO: &str = "\
        .org 0
        HLT
        .org 0x08
        INP/0           ; status
        NDI 2           ; data ready?
        JTZ done
        INP/1
        OUT/1
done:   .set 0x1F       ; RETI
";

fn machine(source: &str, input: &[u8]) -> Machine<ScriptedConsole> {
    let rom = assemble(source)
        .unwrap_or_else(|e| panic!("assembly failed: {e}"))
        .into_image();
    Machine::new(&MachineConfig::with_rom(rom), ScriptedConsole::new(input))
        .unwrap_or_else(|e| panic!("machine setup failed: {e}"))
}

fn run_to_end(machine: &mut Machine<ScriptedConsole>) {
    let outcome = machine
        .run(Some(10_000), false)
        .unwrap_or_else(|e| panic!("run failed: {e}"));
    assert_eq!(outcome, RunOutcome::InputClosed);
}

#[test]
fn test_echo_through_interrupts() {
    let mut m = machine(ECHO, b"hello\n");
    run_to_end(&mut m);
    assert_eq!(m.console().output_string(), "hello\n");
    assert_eq!(m.console().remaining_input(), 0);
    assert!(m.bus().interrupts_enabled(), "RETI re-enabled interrupts");
    assert!(m.bus().input_closed());
}

#[test]
fn test_input_queued_after_construction() {
    let mut m = machine(ECHO, b"");
    m.bus_mut().console_mut().push_input(b"late");
    run_to_end(&mut m);
    assert_eq!(m.console().output_string(), "late");
}

#[test]
fn test_echo_with_no_input() {
    let mut m = machine(ECHO, b"");
    run_to_end(&mut m);
    assert!(m.console().output().is_empty());
}

#[test]
fn test_external_stack_push_pop() {
    let source = "\
        .org 0x08
        LAI 0x11
        OUT/7
        LAI 0x22
        OUT/7
        INP/7
        LBA
        INP/7
        LCA
        HLT
";
    let mut m = machine(source, b"");
    run_to_end(&mut m);
    assert_eq!(m.cpu().reg(Reg::B), 0x22);
    assert_eq!(m.cpu().reg(Reg::C), 0x11);
    assert_eq!(m.bus().external_stack().top(), 0);
}

#[test]
fn test_rom_is_read_only_and_ram_mirrors() {
    let source = "\
        .org 0x08
        LHI 0x08
        LLI 0x10
        LMI 0x5A        ; RAM
        LHI 0x00
        LLI 0x20
        LMI 0x77        ; ROM, ignored
        LHI 0x38
        LLI 0x10
        LAM             ; RAM mirror
        HLT
";
    let mut m = machine(source, b"");
    run_to_end(&mut m);
    assert_eq!(m.cpu().reg(Reg::A), 0x5A);
    assert_eq!(m.memory().ram()[0x10], 0x5A);
    assert_eq!(m.memory().peek(0x0020), 0x00);
    assert_eq!(m.query("memory.0x0810"), Some(Value::U8(0x5A)));
}

#[test]
fn test_interrupt_enable_port() {
    let source = "\
        .org 0x08
        LAI 1
        OUT/0
        INP/0
        LBA
        XRA
        OUT/0
        INP/0
        LCA
        HLT
";
    let mut m = machine(source, b"");
    run_to_end(&mut m);
    assert_eq!(m.cpu().reg(Reg::B), 0x01);
    assert_eq!(m.cpu().reg(Reg::C), 0x00);
    assert!(!m.bus().interrupts_enabled());
}

#[test]
fn test_console_read_without_data() {
    let mut m = machine(".org 0x08\nINP/1\nHLT\n", b"");
    run_to_end(&mut m);
    assert_eq!(m.cpu().reg(Reg::A), 0xFF);
}

#[test]
fn test_unimplemented_opcode_stops_run() {
    let mut m = machine(".org 0x08\n.set 0x38\n", b"");
    match m.run(Some(100), false) {
        Err(MachineError::Exec(ExecError::Unimplemented { opcode, address })) => {
            assert_eq!(opcode, 0x38);
            assert_eq!(address, 0x0008);
        }
        other => panic!("expected unimplemented opcode, got {other:?}"),
    }
}

#[test]
fn test_cycle_limit() {
    let mut m = machine(".org 0x08\nloop: JMP loop\n", b"");
    let outcome = m.run(Some(100), false).expect("runs");
    assert_eq!(outcome, RunOutcome::CycleLimit);
    assert_eq!(m.cycles(), 100);
    assert_eq!(m.cpu().stack().pc(), 0x08);

    m.run(Some(5), false).expect("runs");
    assert_eq!(m.cycles(), 105);
}

#[test]
fn test_trace_run_matches_plain_run() {
    let mut plain = machine(ECHO, b"ok");
    run_to_end(&mut plain);

    let mut traced = machine(ECHO, b"ok");
    let outcome = traced.run(Some(10_000), true).expect("runs");
    assert_eq!(outcome, RunOutcome::InputClosed);
    assert_eq!(traced.console().output(), plain.console().output());
    assert_eq!(traced.cycles(), plain.cycles());
}

#[test]
fn test_oversized_rom_rejected() {
    let result = Machine::new(
        &MachineConfig::with_rom(vec![0; 0x0900]),
        ScriptedConsole::default(),
    );
    assert!(matches!(
        result,
        Err(MachineError::RomTooLarge {
            size: 0x0900,
            capacity: 0x0800
        })
    ));
}

#[test]
fn test_observable_paths() {
    let mut m = machine(ECHO, b"x");
    run_to_end(&mut m);

    assert_eq!(m.query("cpu.halted"), Some(Value::Bool(true)));
    assert_eq!(m.query("cpu.pc"), Some(Value::U16(0x0001)));
    assert_eq!(m.query("memory.0"), Some(Value::U8(0x00)));
    assert_eq!(m.query("memory.0x0008"), Some(Value::U8(0x41)));
    assert_eq!(m.query("cycles"), Some(Value::U64(m.cycles())));
    assert_eq!(m.query("io.int_enabled"), Some(Value::Bool(true)));
    assert_eq!(m.query("io.pending"), Some(Value::Bool(false)));
    assert_eq!(m.query("io.input_closed"), Some(Value::Bool(true)));
    assert_eq!(m.query("memory.nope"), None);
    assert_eq!(m.query("bogus"), None);
    assert!(m.query_paths().contains(&"memory.<address>"));
}
