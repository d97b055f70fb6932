//! i8008asm: assemble 8008 source into a raw binary image.
//!
//! Usage: i8008asm [INPUT] [-o OUTPUT] [--listing]
//!
//! Reads stdin and writes stdout when no paths are given.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use intel_8008::disasm;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "i8008asm", about = "Assemble Intel 8008 source into a binary image")]
struct Args {
    /// Source file (stdin if omitted).
    input: Option<PathBuf>,

    /// Output file (stdout if omitted).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print a disassembly listing of the image to stderr.
    #[arg(short, long, default_value_t = false)]
    listing: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let source = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            text
        }
    };

    let program = intel_8008_asm::assemble(&source).context("assembly failed")?;
    tracing::info!(
        bytes = program.image().len(),
        symbols = program.symbols().len(),
        "assembled"
    );

    if args.listing {
        for line in disasm::disassemble(program.image(), 0) {
            eprintln!("{:04X}  {line}", line.address);
        }
    }

    match &args.output {
        Some(path) => fs::write(path, program.image())
            .with_context(|| format!("writing {}", path.display()))?,
        None => io::stdout()
            .write_all(program.image())
            .context("writing stdout")?,
    }
    Ok(())
}
