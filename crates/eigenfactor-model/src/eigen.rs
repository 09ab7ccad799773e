//! Eigenvalue, eigenvector and eigenpair value types.

use crate::error::{EigenError, Result};
use ndarray::{Array1, ArrayView1};
use std::fmt;

/// Absolute tolerance on an eigenvector's Euclidean norm.
pub const UNIT_NORM_TOLERANCE: f64 = 1e-8;

/// A single eigenvalue.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Eigenvalue(f64);

impl Eigenvalue {
    /// An eigenvalue of a correlation matrix, which must be strictly positive.
    ///
    /// # Errors
    /// Returns [`EigenError::InvalidEigenvalue`] for zero, negative or
    /// non-finite values.
    pub fn positive(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(EigenError::InvalidEigenvalue(value));
        }
        Ok(Self(value))
    }

    /// An eigenvalue that may be negative, for inputs carrying numerical noise.
    ///
    /// # Errors
    /// Returns [`EigenError::InvalidEigenvalue`] for non-finite values.
    pub fn allowing_negative(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(EigenError::InvalidEigenvalue(value));
        }
        Ok(Self(value))
    }

    /// The raw value.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Eigenvalue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// A unit-length eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub struct Eigenvector(Array1<f64>);

impl Eigenvector {
    /// Validate and wrap an eigenvector.
    ///
    /// # Errors
    /// Returns [`EigenError::InvalidEigenvector`] if the vector is empty,
    /// contains a non-finite value, or its norm is not 1 within
    /// [`UNIT_NORM_TOLERANCE`].
    pub fn new(values: Array1<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(EigenError::InvalidEigenvector("empty".to_string()));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EigenError::InvalidEigenvector(
                "contains non-finite values".to_string(),
            ));
        }
        let norm = values.dot(&values).sqrt();
        if (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
            return Err(EigenError::InvalidEigenvector(format!(
                "norm is {norm}, expected 1"
            )));
        }
        Ok(Self(values))
    }

    /// Number of coordinates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Coordinates.
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }
}

/// One retained result of an eigendecomposition.
///
/// `EigenvalueOnly` drops the vector to save memory when only the
/// eigenvalue is needed downstream; it is the only way to have an eigenpair
/// without an eigenvector.
#[derive(Debug, Clone, PartialEq)]
pub enum Eigenpair {
    /// Eigenvalue with its eigenvector
    Full {
        /// The eigenvalue
        eigenvalue: Eigenvalue,
        /// The unit eigenvector
        eigenvector: Eigenvector,
    },
    /// Eigenvalue whose eigenvector was not kept
    EigenvalueOnly(Eigenvalue),
}

impl Eigenpair {
    /// Pair an eigenvalue with its eigenvector.
    pub const fn new(eigenvalue: Eigenvalue, eigenvector: Eigenvector) -> Self {
        Self::Full {
            eigenvalue,
            eigenvector,
        }
    }

    /// An eigenpair that only carries its eigenvalue.
    pub const fn eigenvalue_only(eigenvalue: Eigenvalue) -> Self {
        Self::EigenvalueOnly(eigenvalue)
    }

    /// The eigenvalue.
    pub const fn eigenvalue(&self) -> Eigenvalue {
        match self {
            Self::Full { eigenvalue, .. } | Self::EigenvalueOnly(eigenvalue) => *eigenvalue,
        }
    }

    /// The eigenvector, if it was kept.
    pub const fn eigenvector(&self) -> Option<&Eigenvector> {
        match self {
            Self::Full { eigenvector, .. } => Some(eigenvector),
            Self::EigenvalueOnly(_) => None,
        }
    }

    /// Same eigenvalue, eigenvector dropped.
    pub const fn without_eigenvector(&self) -> Self {
        Self::EigenvalueOnly(self.eigenvalue())
    }
}
