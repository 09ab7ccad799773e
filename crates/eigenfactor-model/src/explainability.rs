//! Explainability fraction and restrictions on how many dimensions to use.

use crate::error::{EigenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fraction of total variance explained by the retained eigenpairs.
///
/// Always strictly between 0 and 1: an eigendecomposition that explains
/// nothing is useless, and one that explains everything has skipped nothing.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct EigenExplainabilityFraction(f64);

impl EigenExplainabilityFraction {
    /// Validate and wrap a fraction.
    ///
    /// # Errors
    /// Returns [`EigenError::OutOfRange`] unless `0 < value < 1`.
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value <= 0.0 || value >= 1.0 {
            return Err(EigenError::OutOfRange(format!(
                "explainability fraction {value} must be strictly between 0 and 1"
            )));
        }
        Ok(Self(value))
    }

    /// The raw fraction.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for EigenExplainabilityFraction {
    type Error = EigenError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<EigenExplainabilityFraction> for f64 {
    fn from(fraction: EigenExplainabilityFraction) -> Self {
        fraction.0
    }
}

impl fmt::Display for EigenExplainabilityFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0 * 100.0)
    }
}

/// Restrictions on how many retained dimensions a consumer may use.
///
/// Only `max_eigenvectors` is supported. A `max_explainability` restriction
/// is accepted here but rejected when applied by
/// [`MaximumEigenDimensionIndexCalculator`](crate::truncation::MaximumEigenDimensionIndexCalculator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EigenExplainabilityRestrictions {
    /// Use at most this many eigenvectors
    pub max_eigenvectors: Option<usize>,

    /// Use only as many eigenvectors as needed to explain this fraction
    pub max_explainability: Option<EigenExplainabilityFraction>,
}

impl EigenExplainabilityRestrictions {
    /// No restriction at all.
    pub const fn unrestricted() -> Self {
        Self {
            max_eigenvectors: None,
            max_explainability: None,
        }
    }

    /// Restrict to at most `max` eigenvectors.
    ///
    /// # Errors
    /// Returns [`EigenError::OutOfRange`] for zero.
    pub fn with_max_eigenvectors(max: usize) -> Result<Self> {
        if max == 0 {
            return Err(EigenError::OutOfRange(
                "maximum number of eigenvectors must be positive".to_string(),
            ));
        }
        Ok(Self {
            max_eigenvectors: Some(max),
            max_explainability: None,
        })
    }
}
