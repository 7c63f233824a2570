//! Fraction value object for unit-interval parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A finite value in `[0, 1]`.
///
/// Used for analysis parameters such as a sensitivity variation range or a
/// Monte Carlo uncertainty level, and for stability indices on the way out.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fraction(f64);

impl Fraction {
    /// Zero.
    pub const ZERO: Self = Self(0.0);

    /// One.
    pub const ONE: Self = Self(1.0);

    /// Creates a Fraction in the closed interval `[0, 1]`.
    pub fn try_closed(field: &str, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::out_of_range(field, 0.0, 1.0, value));
        }
        Ok(Self(value))
    }

    /// Creates a Fraction in the open interval `(0, 1)`.
    pub fn try_open(field: &str, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value <= 0.0 || value >= 1.0 {
            return Err(ValidationError::out_of_range(field, 0.0, 1.0, value));
        }
        Ok(Self(value))
    }

    /// Creates a Fraction, clamping into `[0, 1]`. NaN becomes zero.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Returns the value on a 0-100 scale.
    pub fn as_percent(&self) -> f64 {
        self.0 * 100.0
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.as_percent())
    }
}
