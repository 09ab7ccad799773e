//! Single realized return.

use crate::error::{Result, ReturnsError};
use serde::{Deserialize, Serialize};

/// Lowest possible return of a long position (a total loss).
pub const MIN_RETURN: f64 = -1.0;

/// A realized return over one period, as a fraction (0.01 = +1%).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ReturnValue(f64);

impl ReturnValue {
    /// Validate and wrap a raw return.
    ///
    /// # Errors
    /// Returns [`ReturnsError::InvalidReturn`] for non-finite values and for
    /// values below -100%.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < MIN_RETURN {
            return Err(ReturnsError::InvalidReturn(value));
        }
        Ok(Self(value))
    }

    /// The raw return.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for ReturnValue {
    type Error = ReturnsError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ReturnValue> for f64 {
    fn from(value: ReturnValue) -> Self {
        value.0
    }
}
