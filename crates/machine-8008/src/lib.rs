//! Reference Intel 8008 platform.
//!
//! A small machine around the [`intel_8008`] engine: 2 KiB of ROM and
//! 2 KiB of RAM split on address bit 11, a byte console, an eight-entry
//! external stack on port selector 7, and interrupt glue that jams RST 1
//! on acknowledge.
//!
//! ```no_run
//! use machine_8008::{Machine, MachineConfig, RunOutcome, StdConsole};
//!
//! let rom = std::fs::read("monitor.bin")?;
//! let mut machine = Machine::new(&MachineConfig::with_rom(rom), StdConsole::spawn()?)?;
//! assert_eq!(machine.run(None, false)?, RunOutcome::InputClosed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod bus;
mod config;
mod console;
mod error;
mod machine;
mod memory;

pub use bus::{ExternalStack, MachineBus, RETI};
pub use config::MachineConfig;
pub use console::{Console, ScriptedConsole, StdConsole};
pub use error::MachineError;
pub use machine::{Machine, RunOutcome};
pub use memory::Memory;
