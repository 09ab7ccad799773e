//! How many top eigenpairs are needed to cover a fraction of variance.

use crate::error::{EigenError, Result};
use log::{debug, warn};

/// Negative eigenvalues above this are numerical noise and are skipped.
pub const NEGATIVE_EIGENVALUE_TOLERANCE: f64 = -1e-6;

/// Coverage policy over ascending eigenvalues.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageCalculator;

impl CoverageCalculator {
    /// Create a calculator.
    pub const fn new() -> Self {
        Self
    }

    /// Sum of the strictly positive eigenvalues, added largest first.
    ///
    /// The order matches the walk in
    /// [`Self::num_eigenpairs_for_minimum_coverage`], so consuming every
    /// positive eigenvalue there reproduces this sum exactly.
    ///
    /// # Errors
    /// Returns an error if the input is not strictly ascending or contains
    /// an eigenvalue at or below [`NEGATIVE_EIGENVALUE_TOLERANCE`].
    pub fn positive_eigenvalue_sum(&self, eigenvalues_ascending: &[f64]) -> Result<f64> {
        if let Some(pair) = eigenvalues_ascending.windows(2).find(|p| p[0] >= p[1]) {
            return Err(EigenError::Ordering(format!(
                "eigenvalues must be strictly ascending: {} is followed by {}",
                pair[0], pair[1]
            )));
        }

        let mut sum = 0.0;
        for &value in eigenvalues_ascending.iter().rev() {
            if !value.is_finite() {
                return Err(EigenError::InvalidEigenvalue(value));
            }
            if value > 0.0 {
                sum += value;
            } else if value > NEGATIVE_EIGENVALUE_TOLERANCE {
                warn!("Ignoring slightly negative eigenvalue {value:e}");
            } else {
                return Err(EigenError::InvalidEigenvalue(value));
            }
        }
        Ok(sum)
    }

    /// Number of top eigenpairs whose eigenvalues reach `min_coverage` of
    /// the positive eigenvalue sum.
    ///
    /// Walks from the largest eigenvalue down and stops at the first count
    /// whose cumulative fraction is at least `min_coverage`.
    ///
    /// # Errors
    /// Returns an error if `min_coverage` is not in `(0, 1]`, if the input
    /// fails [`Self::positive_eigenvalue_sum`], or if coverage is never reached.
    pub fn num_eigenpairs_for_minimum_coverage(
        &self,
        eigenvalues_ascending: &[f64],
        min_coverage: f64,
    ) -> Result<usize> {
        if min_coverage.is_nan() || min_coverage <= 0.0 || min_coverage > 1.0 {
            return Err(EigenError::OutOfRange(format!(
                "minimum coverage {min_coverage} must be in (0, 1]"
            )));
        }

        let total = self.positive_eigenvalue_sum(eigenvalues_ascending)?;
        if total <= 0.0 {
            return Err(EigenError::CoverageUnreachable {
                target: min_coverage,
                reached: 0.0,
            });
        }

        let mut cumulative = 0.0;
        let mut count = 0;
        for &value in eigenvalues_ascending.iter().rev() {
            if value <= 0.0 {
                break;
            }
            cumulative += value;
            count += 1;
            if cumulative / total >= min_coverage {
                debug!(
                    "{count} of {} eigenpairs cover {:.4} (target {min_coverage})",
                    eigenvalues_ascending.len(),
                    cumulative / total
                );
                return Ok(count);
            }
        }

        Err(EigenError::CoverageUnreachable {
            target: min_coverage,
            reached: cumulative / total,
        })
    }
}
