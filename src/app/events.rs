//! Outbound telemetry values.
//!
//! A [`Measurement`] pairs a topic fragment with a stringifiable scalar.
//! Formatting is an explicit contract here because the broker side parses
//! the rendered strings: floats always carry three decimal places, integers
//! render plainly.

use core::fmt;

/// A scalar reading ready for publishing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Int(i32),
    Uint(u32),
    Float(f32),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.3}"),
        }
    }
}

/// A named value destined for `/{site}/{room}/{name}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub name: &'static str,
    pub value: Scalar,
}

impl Measurement {
    pub fn new(name: &'static str, value: Scalar) -> Self {
        Self { name, value }
    }

    /// Render the wire payload.
    pub fn payload(&self) -> String {
        self.value.to_string()
    }
}
