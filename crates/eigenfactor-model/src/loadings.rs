//! Factor loadings and their computation.
//!
//! The loading of entity i on retained factor f is the projection of the
//! entity's correlation row onto the factor's eigenvector:
//!
//! L[i, f] = Σ_k v_f[k] · C[i, k]
//!
//! i.e. L = C · V where the columns of V are the retained eigenvectors in
//! descending eigenvalue order.

use crate::eigen::Eigenpair;
use crate::error::{EigenError, Result};
use eigenfactor_returns::Investable;
use ndarray::{Array1, Array2, ArrayView1, s};
use std::fmt;

/// One entity's exposure to each retained factor, largest factor first.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorLoadings(Array1<f64>);

impl FactorLoadings {
    /// Validate and wrap a loadings vector.
    ///
    /// # Errors
    /// Returns an error if the vector is empty or holds a non-finite value.
    pub fn new(values: Array1<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(EigenError::Empty("factor loadings".to_string()));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EigenError::OutOfRange(
                "factor loadings must be finite".to_string(),
            ));
        }
        Ok(Self(values))
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Loading on factor `index`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// All loadings.
    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    /// The first `len` loadings as a new vector.
    pub(crate) fn prefix(&self, len: usize) -> Result<Self> {
        if len > self.len() {
            return Err(EigenError::DimensionMismatch {
                context: "loadings prefix".to_string(),
                expected: len,
                actual: self.len(),
            });
        }
        Self::new(self.0.slice(s![..len]).to_owned())
    }
}

impl fmt::Display for FactorLoadings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.4}")?;
        }
        write!(f, "]")
    }
}

/// Factor loadings labeled with the entity they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentLoadings<K> {
    /// The entity
    pub instrument: K,
    /// Its loadings
    pub loadings: FactorLoadings,
}

impl<K> InstrumentLoadings<K> {
    /// Label loadings with their entity.
    pub const fn new(instrument: K, loadings: FactorLoadings) -> Self {
        Self {
            instrument,
            loadings,
        }
    }
}

impl<K: fmt::Display> fmt::Display for InstrumentLoadings<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.instrument, self.loadings)
    }
}

/// Projects correlation rows onto retained eigenvectors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactorLoadingsCalculator;

impl FactorLoadingsCalculator {
    /// Create a calculator.
    pub const fn new() -> Self {
        Self
    }

    /// Loadings of every entity on every retained eigenpair.
    ///
    /// # Arguments
    /// * `correlation` - N x N correlation matrix
    /// * `eigenpairs_descending` - retained eigenpairs, largest eigenvalue first
    /// * `keys` - the entity for each row of `correlation`
    ///
    /// # Errors
    /// Returns an error if the matrix is not N x N for N keys, no eigenpair is
    /// given, an eigenpair has no eigenvector, or an eigenvector's length is
    /// not N.
    pub fn calculate_factor_loadings_by_instrument<K: Investable>(
        &self,
        correlation: &Array2<f64>,
        eigenpairs_descending: &[Eigenpair],
        keys: &[K],
    ) -> Result<Vec<InstrumentLoadings<K>>> {
        let n = keys.len();
        if n == 0 {
            return Err(EigenError::Empty("no entities".to_string()));
        }
        if eigenpairs_descending.is_empty() {
            return Err(EigenError::Empty("no retained eigenpairs".to_string()));
        }
        let (rows, cols) = correlation.dim();
        if rows != n || cols != n {
            return Err(EigenError::DimensionMismatch {
                context: "correlation matrix vs entity count".to_string(),
                expected: n,
                actual: if rows == n { cols } else { rows },
            });
        }

        let mut factors = Array2::<f64>::zeros((n, eigenpairs_descending.len()));
        for (f, pair) in eigenpairs_descending.iter().enumerate() {
            let eigenvector = pair.eigenvector().ok_or_else(|| {
                EigenError::InvalidEigenvector(format!(
                    "eigenpair {f} has no eigenvector to project onto"
                ))
            })?;
            if eigenvector.len() != n {
                return Err(EigenError::DimensionMismatch {
                    context: format!("eigenvector {f} vs entity count"),
                    expected: n,
                    actual: eigenvector.len(),
                });
            }
            factors.column_mut(f).assign(&eigenvector.view());
        }

        let loadings = correlation.dot(&factors);
        keys.iter()
            .zip(loadings.rows())
            .map(|(key, row)| {
                Ok(InstrumentLoadings::new(
                    key.clone(),
                    FactorLoadings::new(row.to_owned())?,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eigen::{Eigenvalue, Eigenvector};
    use approx::assert_abs_diff_eq;
    use eigenfactor_returns::InstrumentId;
    use ndarray::array;

    fn ids(symbols: &[&str]) -> Vec<InstrumentId> {
        symbols.iter().map(|s| InstrumentId::new(*s)).collect()
    }

    fn pair(value: f64, vector: Array1<f64>) -> Eigenpair {
        Eigenpair::new(
            Eigenvalue::positive(value).unwrap(),
            Eigenvector::new(vector).unwrap(),
        )
    }

    #[test]
    fn test_first_axis_reproduces_first_column() {
        let corr = array![[1.0, 0.3, -0.2], [0.3, 1.0, 0.5], [-0.2, 0.5, 1.0]];
        let pairs = vec![pair(1.0, array![1.0, 0.0, 0.0])];
        let loadings = FactorLoadingsCalculator::new()
            .calculate_factor_loadings_by_instrument(&corr, &pairs, &ids(&["A", "B", "C"]))
            .unwrap();

        assert_eq!(loadings.len(), 3);
        for (i, l) in loadings.iter().enumerate() {
            assert_eq!(l.loadings.len(), 1);
            assert_abs_diff_eq!(l.loadings.get(0).unwrap(), corr[[i, 0]]);
        }
        assert_eq!(loadings[1].instrument, InstrumentId::new("B"));
    }

    #[test]
    fn test_projection_on_true_eigenvectors() {
        // [[1, r], [r, 1]] has eigenpairs (1 + r, [1, 1]/√2) and (1 - r, [1, -1]/√2)
        let r = 0.6;
        let s = 0.5_f64.sqrt();
        let corr = array![[1.0, r], [r, 1.0]];
        let pairs = vec![pair(1.0 + r, array![s, s]), pair(1.0 - r, array![s, -s])];
        let loadings = FactorLoadingsCalculator::new()
            .calculate_factor_loadings_by_instrument(&corr, &pairs, &ids(&["A", "B"]))
            .unwrap();

        // C·v = λ·v
        assert_abs_diff_eq!(loadings[0].loadings.get(0).unwrap(), (1.0 + r) * s, epsilon = 1e-12);
        assert_abs_diff_eq!(loadings[0].loadings.get(1).unwrap(), (1.0 - r) * s, epsilon = 1e-12);
        assert_abs_diff_eq!(loadings[1].loadings.get(1).unwrap(), -(1.0 - r) * s, epsilon = 1e-12);
    }

    #[test]
    fn test_eigenvector_length_must_match() {
        let corr = Array2::<f64>::eye(3);
        let pairs = vec![pair(1.0, array![1.0, 0.0])];
        let result = FactorLoadingsCalculator::new().calculate_factor_loadings_by_instrument(
            &corr,
            &pairs,
            &ids(&["A", "B", "C"]),
        );
        assert!(matches!(
            result,
            Err(EigenError::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn test_eigenvalue_only_pair_rejected() {
        let corr = Array2::<f64>::eye(1);
        let pairs = vec![Eigenpair::eigenvalue_only(Eigenvalue::positive(1.0).unwrap())];
        let result = FactorLoadingsCalculator::new().calculate_factor_loadings_by_instrument(
            &corr,
            &pairs,
            &ids(&["A"]),
        );
        assert!(matches!(result, Err(EigenError::InvalidEigenvector(_))));
    }

    #[test]
    fn test_factor_loadings_validation_and_display() {
        assert!(FactorLoadings::new(Array1::zeros(0)).is_err());
        assert!(FactorLoadings::new(array![f64::NAN]).is_err());

        let l = FactorLoadings::new(array![0.5, -0.25]).unwrap();
        assert_eq!(l.prefix(1).unwrap().view(), array![0.5].view());
        assert!(l.prefix(3).is_err());

        let labeled = InstrumentLoadings::new(InstrumentId::new("AAPL"), l);
        assert_eq!(labeled.to_string(), "AAPL: [0.5000, -0.2500]");
    }
}
