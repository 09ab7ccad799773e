//! Sample statistics over return matrices.
//!
//! Standard deviations use the one-pass sample formula
//!
//! var = (Σx² - mean·Σx) / (M - 1)
//!
//! over each column of an M x N matrix.

use crate::error::{Result, ReturnsError};
use crate::investable::Investable;
use crate::returns::ReturnsInMatrixForm;
use log::warn;
use ndarray::{Array1, Array2, ArrayView1};
use std::collections::HashMap;

/// Negative variance above this is treated as cancellation noise.
const VARIANCE_NOISE_TOLERANCE: f64 = 1e-12;

/// A column whose variance is at most this fraction of its mean square is
/// constant up to rounding.
const ZERO_VARIANCE_RELATIVE_TOLERANCE: f64 = 1e-12;

/// Sample mean and variance of one column.
fn column_moments(column: ArrayView1<'_, f64>) -> Result<(f64, f64)> {
    let m = column.len() as f64;
    let sum = column.sum();
    let sum_of_squares = column.iter().map(|x| x * x).sum::<f64>();
    let mean = sum / m;
    let variance = (sum_of_squares - mean * sum) / (m - 1.0);

    if variance >= 0.0 {
        Ok((mean, variance))
    } else if variance > -VARIANCE_NOISE_TOLERANCE {
        warn!("Clamping variance {variance:e} to zero");
        Ok((mean, 0.0))
    } else {
        Err(ReturnsError::InvalidStatistic(format!(
            "negative variance {variance}"
        )))
    }
}

/// Per-column sample standard deviation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDeviationsCalculator;

impl StandardDeviationsCalculator {
    /// Create a calculator.
    pub const fn new() -> Self {
        Self
    }

    /// Sample standard deviation of every column of `matrix`.
    ///
    /// # Errors
    /// Returns [`ReturnsError::InsufficientData`] with fewer than two rows.
    pub fn calculate(&self, matrix: &Array2<f64>) -> Result<Array1<f64>> {
        let (n_rows, n_cols) = matrix.dim();
        if n_rows < 2 {
            return Err(ReturnsError::InsufficientData {
                required: 2,
                actual: n_rows,
            });
        }

        let mut std_devs = Array1::<f64>::zeros(n_cols);
        for (j, column) in matrix.columns().into_iter().enumerate() {
            let (_, variance) = column_moments(column)?;
            std_devs[j] = variance.sqrt();
        }
        Ok(std_devs)
    }
}

/// Pearson correlation matrix of the columns of `matrix`.
///
/// # Errors
/// Returns an error with fewer than two rows or when a column is constant.
pub fn correlation_matrix(matrix: &Array2<f64>) -> Result<Array2<f64>> {
    let (n_rows, n_cols) = matrix.dim();
    if n_rows < 2 {
        return Err(ReturnsError::InsufficientData {
            required: 2,
            actual: n_rows,
        });
    }

    let mut centered = matrix.clone();
    for (j, mut column) in centered.columns_mut().into_iter().enumerate() {
        let (mean, variance) = column_moments(matrix.column(j))?;
        let mean_square = matrix.column(j).iter().map(|x| x * x).sum::<f64>() / n_rows as f64;
        if variance <= ZERO_VARIANCE_RELATIVE_TOLERANCE * mean_square {
            return Err(ReturnsError::InvalidStatistic(format!(
                "column {j} has zero variance"
            )));
        }
        let std_dev = variance.sqrt();
        column.mapv_inplace(|x| (x - mean) / std_dev);
    }

    // Z^T Z / (M - 1)
    let mut corr = centered.t().dot(&centered) / (n_rows as f64 - 1.0);
    for i in 0..n_cols {
        corr[[i, i]] = 1.0;
        for j in (i + 1)..n_cols {
            let value = corr[[i, j]].clamp(-1.0, 1.0);
            corr[[i, j]] = value;
            corr[[j, i]] = value;
        }
    }
    Ok(corr)
}

/// Realized volatility per entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RealizedVolatilities<K: Investable> {
    by_key: HashMap<K, f64>,
}

impl<K: Investable> RealizedVolatilities<K> {
    /// Wrap precomputed volatilities.
    ///
    /// # Errors
    /// Returns an error if the map is empty or a volatility is negative or
    /// not finite.
    pub fn new(by_key: HashMap<K, f64>) -> Result<Self> {
        if by_key.is_empty() {
            return Err(ReturnsError::Empty("realized volatilities".to_string()));
        }
        if let Some((key, vol)) = by_key.iter().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(ReturnsError::InvalidStatistic(format!(
                "volatility {vol} for {}",
                key.investable_id()
            )));
        }
        Ok(Self { by_key })
    }

    /// Sample standard deviation of each entity's returns, scaled by
    /// `annualization_factor`.
    pub fn from_returns(
        returns: &ReturnsInMatrixForm<K>,
        annualization_factor: f64,
    ) -> Result<Self> {
        let std_devs = StandardDeviationsCalculator::new().calculate(returns.returns().values())?;
        let by_key = returns
            .keys()
            .iter()
            .cloned()
            .zip(std_devs.iter().map(|sd| sd * annualization_factor))
            .collect();
        Self::new(by_key)
    }

    /// Volatility of one entity.
    pub fn get(&self, key: &K) -> Option<f64> {
        self.by_key.get(key).copied()
    }

    /// Entities covered.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.by_key.keys()
    }

    /// Number of entities covered.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether no entity is covered.
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Whether `key` is covered.
    pub fn contains(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investable::InstrumentId;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rstest::rstest;

    #[test]
    fn test_sample_standard_deviation() {
        let matrix = array![[1.0, 2.0], [2.0, 2.0], [3.0, 2.0], [4.0, 2.0], [5.0, 2.0]];
        let std_devs = StandardDeviationsCalculator::new().calculate(&matrix).unwrap();

        // Sample variance of [1,2,3,4,5] = 2.5
        assert_abs_diff_eq!(std_devs[0], 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(std_devs[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_standard_deviation_needs_two_rows() {
        let matrix = array![[1.0, 2.0]];
        assert!(matches!(
            StandardDeviationsCalculator::new().calculate(&matrix),
            Err(ReturnsError::InsufficientData { required: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_correlation_matrix() {
        let matrix = array![[1.0, 2.0, 5.0], [2.0, 4.0, 3.0], [3.0, 6.0, 4.0], [4.0, 8.0, 1.0]];
        let corr = correlation_matrix(&matrix).unwrap();

        assert_abs_diff_eq!(corr[[0, 0]], 1.0);
        assert_abs_diff_eq!(corr[[0, 1]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corr[[1, 0]], corr[[0, 1]]);
        assert!(corr[[0, 2]] < 0.0);
        assert_abs_diff_eq!(corr[[0, 2]], corr[[2, 0]]);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.01)]
    #[case(0.1)]
    #[case(1.1)]
    #[case(2.0)]
    fn test_correlation_rejects_constant_column(#[case] constant: f64) {
        let varying = [0.03, -0.01, 0.02, 0.05, -0.04, 0.01, 0.00];
        let matrix =
            Array2::from_shape_fn((7, 2), |(i, j)| if j == 0 { varying[i] } else { constant });
        assert!(matches!(
            correlation_matrix(&matrix),
            Err(ReturnsError::InvalidStatistic(_))
        ));
    }

    #[test]
    fn test_realized_volatilities_validation() {
        let mut map = HashMap::new();
        map.insert(InstrumentId::new("A"), 0.2);
        assert!(RealizedVolatilities::new(map.clone()).is_ok());

        map.insert(InstrumentId::new("B"), -0.1);
        assert!(RealizedVolatilities::new(map).is_err());
        assert!(RealizedVolatilities::<InstrumentId>::new(HashMap::new()).is_err());
    }
}
