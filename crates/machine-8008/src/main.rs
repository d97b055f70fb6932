//! i8008emu: run a ROM image on the reference 8008 platform.
//!
//! Usage: i8008emu [--trace] [--max-cycles N] ROM
//!
//! The console is wired to stdin and stdout. The run ends when stdin closes
//! and the CPU is left stopped waiting for input.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use machine_8008::{Machine, MachineConfig, RunOutcome, StdConsole};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "i8008emu", about = "Run an Intel 8008 ROM image")]
struct Args {
    /// ROM image, loaded at address 0.
    rom: PathBuf,

    /// Print PC, opcode, A, H, L and the disassembly for each instruction.
    #[arg(short, long, default_value_t = false)]
    trace: bool,

    /// Stop after this many instruction cycles.
    #[arg(long, value_name = "N")]
    max_cycles: Option<u64>,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let filter = if args.trace {
        filter.add_directive("trace=info".parse()?)
    } else {
        filter
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    let rom = fs::read(&args.rom).with_context(|| format!("reading {}", args.rom.display()))?;
    let console = StdConsole::spawn().context("starting console")?;
    let mut machine = Machine::new(&MachineConfig::with_rom(rom), console)
        .context("building machine")?;

    let outcome = machine
        .run(args.max_cycles, args.trace)
        .with_context(|| format!("after {} cycles", machine.cycles()))?;
    match outcome {
        RunOutcome::InputClosed => Ok(ExitCode::SUCCESS),
        RunOutcome::CycleLimit => {
            tracing::warn!(cycles = machine.cycles(), "cycle limit reached");
            Ok(ExitCode::from(2))
        }
    }
}
