//! Angles between loading vectors.
//!
//! cos(θ) = (a · b) / (‖a‖ ‖b‖)

use crate::error::{EigenError, Result};
use crate::loadings::FactorLoadings;
use ndarray::{ArrayView1, s};
use std::fmt;

/// Vectors with a norm at or below this have no direction.
pub const MIN_MAGNITUDE: f64 = 1e-8;

/// Angle between two vectors, kept as its cosine.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Angle {
    cosine: f64,
}

impl Angle {
    /// Angle with the given cosine.
    ///
    /// Cosines that overshoot [-1, 1] by rounding error are clamped.
    ///
    /// # Errors
    /// Returns [`EigenError::OutOfRange`] for a non-finite cosine or one
    /// further than [`MIN_MAGNITUDE`] outside [-1, 1].
    pub fn from_cosine(cosine: f64) -> Result<Self> {
        if !cosine.is_finite() || cosine.abs() > 1.0 + MIN_MAGNITUDE {
            return Err(EigenError::OutOfRange(format!(
                "cosine {cosine} is outside [-1, 1]"
            )));
        }
        Ok(Self {
            cosine: cosine.clamp(-1.0, 1.0),
        })
    }

    /// Cosine of the angle; 1 for identical directions.
    pub const fn cosine(self) -> f64 {
        self.cosine
    }

    /// Angle in radians, in [0, π].
    pub fn radians(self) -> f64 {
        self.cosine.acos()
    }

    /// Angle in degrees, in [0, 180].
    pub fn degrees(self) -> f64 {
        self.radians().to_degrees()
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°", self.degrees())
    }
}

/// Cosine-similarity angle over a prefix of two vectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawAngleCalculator;

impl RawAngleCalculator {
    /// Create a calculator.
    pub const fn new() -> Self {
        Self
    }

    /// Angle between the first `max_size` coordinates of two vectors.
    ///
    /// # Errors
    /// Returns an error if `max_size` is zero or exceeds either vector's
    /// length, or if either restricted vector has a norm at or below
    /// [`MIN_MAGNITUDE`].
    pub fn calculate_angle<'v>(
        &self,
        vector1: ArrayView1<'v, f64>,
        vector2: ArrayView1<'v, f64>,
        max_size: usize,
    ) -> Result<Angle> {
        if max_size == 0 {
            return Err(EigenError::OutOfRange(
                "angle needs at least one coordinate".to_string(),
            ));
        }
        for (name, v) in [("first", &vector1), ("second", &vector2)] {
            if v.len() < max_size {
                return Err(EigenError::DimensionMismatch {
                    context: format!("{name} vector for angle"),
                    expected: max_size,
                    actual: v.len(),
                });
            }
        }

        let a = vector1.slice(s![..max_size]);
        let b = vector2.slice(s![..max_size]);
        let magnitude_a = a.dot(&a).sqrt();
        let magnitude_b = b.dot(&b).sqrt();
        if magnitude_a <= MIN_MAGNITUDE || magnitude_b <= MIN_MAGNITUDE {
            return Err(EigenError::UndefinedAngle(format!(
                "magnitudes {magnitude_a:e} and {magnitude_b:e}"
            )));
        }

        Angle::from_cosine(a.dot(&b) / (magnitude_a * magnitude_b))
    }
}

/// Angles between entities' factor loadings.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleInEigenspaceCalculator {
    raw: RawAngleCalculator,
}

impl AngleInEigenspaceCalculator {
    /// Create a calculator.
    pub const fn new() -> Self {
        Self {
            raw: RawAngleCalculator::new(),
        }
    }

    /// Angle between two loading vectors from the same eigendecomposition.
    ///
    /// # Errors
    /// Returns [`EigenError::DimensionMismatch`] if the lengths differ.
    pub fn calculate_angle_in_same_eigenspace(
        &self,
        reference: &FactorLoadings,
        compared: &FactorLoadings,
    ) -> Result<Angle> {
        if reference.len() != compared.len() {
            return Err(EigenError::DimensionMismatch {
                context: "loadings in the same eigenspace".to_string(),
                expected: reference.len(),
                actual: compared.len(),
            });
        }
        self.raw
            .calculate_angle(reference.view(), compared.view(), reference.len())
    }

    /// Angle between loading vectors from two different eigendecompositions.
    ///
    /// Compares the first `min(max_dimensions, reference.len(),
    /// compared.len())` coordinates. Dimension k of one decomposition need
    /// not mean the same thing as dimension k of the other, so this is only
    /// a rough similarity measure.
    pub fn calculate_angle_in_different_eigenspaces(
        &self,
        reference: &FactorLoadings,
        compared: &FactorLoadings,
        max_dimensions: usize,
    ) -> Result<Angle> {
        let size = max_dimensions.min(reference.len()).min(compared.len());
        self.raw
            .calculate_angle(reference.view(), compared.view(), size)
    }
}
