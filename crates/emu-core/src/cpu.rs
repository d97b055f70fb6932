//! CPU core trait.

/// A CPU core.
///
/// Each core decides how it is driven (per T-state or per instruction);
/// this trait only covers what platforms and debuggers need to observe and
/// signal from outside.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Returns the current program counter.
    ///
    /// Returns `u32` so cores with wider address buses fit the same trait.
    /// The 8008 zero-extends its 14-bit PC.
    fn pc(&self) -> u32;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is halted.
    fn is_halted(&self) -> bool;

    /// Request an interrupt. Returns true if accepted.
    fn interrupt(&mut self) -> bool;
}
