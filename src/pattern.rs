//! Deterministic input patterns.
//!
//! A pattern is evaluated independently by the driver (when filling the input
//! window) and by the reference model, so it must be a pure function of the
//! coordinates.

use core::fmt;

#[derive(Clone, Copy)]
pub enum Pattern {
    /// Every sample is `1`.
    ConstantOne,
    /// Sample equals its column, truncated to `i8`.
    RampX,
    /// `+1` where `(row ^ col)` is even, `-1` elsewhere.
    Checkerboard,
    /// Caller-supplied pure function of `(row, col)`.
    Custom(&'static str, fn(u8, u8) -> i8),
}

impl Pattern {
    #[inline]
    pub fn eval(&self, row: u8, col: u8) -> i8 {
        match self {
            Pattern::ConstantOne => 1,
            Pattern::RampX => col as i8,
            Pattern::Checkerboard => {
                if (row ^ col) & 1 == 0 {
                    1
                } else {
                    -1
                }
            }
            Pattern::Custom(_, f) => f(row, col),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::ConstantOne => "constant-one",
            Pattern::RampX => "ramp-x",
            Pattern::Checkerboard => "checkerboard",
            Pattern::Custom(name, _) => *name,
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.name()).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
