//! Core traits and types shared by the 8008 engine and its platforms.
//!
//! The engine only talks to the outside world through its pin bus. Memory
//! maps, consoles and test harnesses sit behind the traits defined here.

mod bus;
mod cpu;
mod observable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
