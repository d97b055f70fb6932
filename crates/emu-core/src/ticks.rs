//! Count of bus states.

use std::fmt;

/// A count of bus states (T1, T2, ... WAIT, STOPPED) driven by a CPU.
///
/// The engine has no notion of wall-clock time. Every transaction on the
/// pin bus advances this counter by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Count one more bus state.
    pub fn step(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// States elapsed since `earlier`.
    #[must_use]
    pub const fn since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} states", self.0)
    }
}
