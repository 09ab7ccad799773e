//! Restricting how many retained dimensions a consumer sees.

use crate::decomposition::Eigendecomposition;
use crate::dimension::EigenDimensionIndex;
use crate::eigen::Eigenpair;
use crate::error::{EigenError, Result};
use crate::explainability::EigenExplainabilityRestrictions;
use crate::loadings::FactorLoadings;
use eigenfactor_returns::Investable;
use log::debug;

/// Turns [`EigenExplainabilityRestrictions`] into the last usable dimension.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaximumEigenDimensionIndexCalculator;

impl MaximumEigenDimensionIndexCalculator {
    /// Create a calculator.
    pub const fn new() -> Self {
        Self
    }

    /// Last usable 0-based dimension of `decomposition` under `restrictions`.
    ///
    /// # Errors
    /// Returns [`EigenError::Unsupported`] if a maximum explainability is
    /// requested; only a maximum eigenvector count is implemented.
    pub fn calculate<K: Investable>(
        &self,
        decomposition: &Eigendecomposition<K>,
        restrictions: &EigenExplainabilityRestrictions,
    ) -> Result<EigenDimensionIndex> {
        if let Some(fraction) = restrictions.max_explainability {
            return Err(EigenError::Unsupported(format!(
                "restricting by maximum explainability ({fraction})"
            )));
        }

        let mut count = decomposition.num_retained_eigenpairs();
        if let Some(max) = restrictions.max_eigenvectors {
            count = count.min(max);
        }
        if count == 0 {
            return Err(EigenError::OutOfRange(
                "restrictions leave no eigen-dimensions".to_string(),
            ));
        }

        let index = EigenDimensionIndex::new(count - 1)?;
        debug!(
            "Using {count} of {} eigen-dimensions",
            decomposition.num_retained_eigenpairs()
        );
        Ok(index)
    }
}

/// An [`Eigendecomposition`] viewed through its first
/// `max_valid_index + 1` dimensions.
#[derive(Debug, Clone)]
pub struct TruncatedEigendecomposition<'a, K: Investable> {
    decomposition: &'a Eigendecomposition<K>,
    max_valid_index: EigenDimensionIndex,
}

impl<'a, K: Investable> TruncatedEigendecomposition<'a, K> {
    /// View `decomposition` through dimensions `0..=max_valid_index`.
    ///
    /// # Errors
    /// Returns [`EigenError::OutOfRange`] if `max_valid_index` is not a
    /// retained dimension.
    pub fn new(
        decomposition: &'a Eigendecomposition<K>,
        max_valid_index: EigenDimensionIndex,
    ) -> Result<Self> {
        if max_valid_index.index() >= decomposition.num_retained_eigenpairs() {
            return Err(EigenError::OutOfRange(format!(
                "truncation at {max_valid_index} needs more than the {} retained eigenpairs",
                decomposition.num_retained_eigenpairs()
            )));
        }
        Ok(Self {
            decomposition,
            max_valid_index,
        })
    }

    /// Apply `restrictions` to `decomposition`.
    pub fn with_restrictions(
        decomposition: &'a Eigendecomposition<K>,
        restrictions: &EigenExplainabilityRestrictions,
    ) -> Result<Self> {
        let index = MaximumEigenDimensionIndexCalculator::new().calculate(decomposition, restrictions)?;
        Self::new(decomposition, index)
    }

    /// The underlying decomposition.
    pub const fn decomposition(&self) -> &'a Eigendecomposition<K> {
        self.decomposition
    }

    /// Last usable dimension.
    pub const fn max_valid_index(&self) -> EigenDimensionIndex {
        self.max_valid_index
    }

    /// Number of usable dimensions.
    pub const fn num_eigen_dimensions_after_truncation(&self) -> usize {
        self.max_valid_index.index() + 1
    }

    /// Loading of `key` on a usable dimension.
    ///
    /// # Errors
    /// Returns [`EigenError::OutOfRange`] past [`Self::max_valid_index`].
    pub fn factor_loading(&self, key: &K, dimension: EigenDimensionIndex) -> Result<f64> {
        if dimension > self.max_valid_index {
            return Err(EigenError::OutOfRange(format!(
                "{dimension} is past the truncation at {}",
                self.max_valid_index
            )));
        }
        self.decomposition.factor_loading(key, dimension)
    }

    /// Loadings of `key` on the usable dimensions only, as a new vector.
    ///
    /// # Errors
    /// Returns [`EigenError::KeyMismatch`] if the entity has no loadings.
    pub fn truncated_factor_loadings(&self, key: &K) -> Result<FactorLoadings> {
        self.decomposition
            .factor_loadings(key)
            .ok_or_else(|| {
                EigenError::KeyMismatch(format!("no loadings for {}", key.investable_id()))
            })?
            .prefix(self.num_eigen_dimensions_after_truncation())
    }

    /// Usable eigenpairs, largest eigenvalue first.
    ///
    /// Lazy and restartable: every call starts a fresh pass over the
    /// decomposition's eigenpairs.
    pub fn truncated_eigenpairs_descending(
        &self,
    ) -> impl ExactSizeIterator<Item = &'a Eigenpair> + Clone + use<'a, K> {
        self.decomposition
            .eigenpairs_in_descending_eigenvalues()
            .iter()
            .take(self.num_eigen_dimensions_after_truncation())
    }

    /// Entities.
    pub fn keys(&self) -> &'a [K] {
        self.decomposition.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::{EigendecompositionInputs, EigenvectorLengthPolicy};
    use crate::eigen::{Eigenvalue, Eigenvector};
    use crate::explainability::EigenExplainabilityFraction;
    use crate::loadings::InstrumentLoadings;
    use eigenfactor_returns::{
        InstrumentId, QualityOfReturns, RealizedVolatilities, SingleItemQualityOfReturns,
    };
    use ndarray::{Array1, array};

    /// Four entities, diagonal correlation with distinct variances; retains
    /// three eigenpairs (4, 3, 2) out of a total of 10.
    fn decomposition() -> Eigendecomposition<InstrumentId> {
        let keys: Vec<InstrumentId> = ["A", "B", "C", "D"].iter().map(|s| (*s).into()).collect();
        let eigenvalues = [4.0, 3.0, 2.0];
        let eigenpairs = eigenvalues
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut axis = Array1::<f64>::zeros(4);
                axis[i] = 1.0;
                Eigenpair::new(
                    Eigenvalue::positive(v).unwrap(),
                    Eigenvector::new(axis).unwrap(),
                )
            })
            .collect();
        let loadings = keys
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let values = Array1::from_shape_fn(3, |f| if f == i { eigenvalues[f] } else { 0.0 });
                InstrumentLoadings::new(k.clone(), FactorLoadings::new(values).unwrap())
            })
            .collect();

        Eigendecomposition::new(EigendecompositionInputs {
            description: "diagonal".to_string(),
            explainability_fraction: 0.9,
            sum_of_all_eigenvalues: 10.0,
            eigenpairs_descending: eigenpairs,
            loadings,
            quality_of_returns: QualityOfReturns::new(
                keys.iter()
                    .map(|k| (k.clone(), SingleItemQualityOfReturns::new(5, 0, 0).unwrap()))
                    .collect(),
            )
            .unwrap(),
            realized_volatilities: RealizedVolatilities::new(
                keys.iter().map(|k| (k.clone(), 0.1)).collect(),
            )
            .unwrap(),
            eigenvector_length_policy: EigenvectorLengthPolicy::MatchInstrumentCount,
        })
        .unwrap()
    }

    fn index(i: usize) -> EigenDimensionIndex {
        EigenDimensionIndex::new(i).unwrap()
    }

    #[test]
    fn test_max_index_unrestricted() {
        let d = decomposition();
        let i = MaximumEigenDimensionIndexCalculator::new()
            .calculate(&d, &EigenExplainabilityRestrictions::unrestricted())
            .unwrap();
        assert_eq!(i, index(2));
    }

    #[test]
    fn test_max_index_clamped_by_eigenvector_count() {
        let d = decomposition();
        let calc = MaximumEigenDimensionIndexCalculator::new();

        let two = EigenExplainabilityRestrictions::with_max_eigenvectors(2).unwrap();
        assert_eq!(calc.calculate(&d, &two).unwrap(), index(1));

        let ten = EigenExplainabilityRestrictions::with_max_eigenvectors(10).unwrap();
        assert_eq!(calc.calculate(&d, &ten).unwrap(), index(2));
    }

    #[test]
    fn test_max_explainability_is_unsupported() {
        let d = decomposition();
        let restrictions = EigenExplainabilityRestrictions {
            max_eigenvectors: Some(2),
            max_explainability: Some(EigenExplainabilityFraction::new(0.5).unwrap()),
        };
        assert!(matches!(
            MaximumEigenDimensionIndexCalculator::new().calculate(&d, &restrictions),
            Err(EigenError::Unsupported(_))
        ));
    }

    #[test]
    fn test_zero_max_eigenvectors() {
        let d = decomposition();
        let restrictions = EigenExplainabilityRestrictions {
            max_eigenvectors: Some(0),
            max_explainability: None,
        };
        assert!(MaximumEigenDimensionIndexCalculator::new()
            .calculate(&d, &restrictions)
            .is_err());
    }

    #[test]
    fn test_truncation_bound() {
        let d = decomposition();
        assert!(matches!(
            TruncatedEigendecomposition::new(&d, index(3)),
            Err(EigenError::OutOfRange(_))
        ));

        let full = TruncatedEigendecomposition::new(&d, index(2)).unwrap();
        assert_eq!(
            full.num_eigen_dimensions_after_truncation(),
            d.num_retained_eigenpairs()
        );
    }

    #[test]
    fn test_truncated_accessors() {
        let d = decomposition();
        let t = TruncatedEigendecomposition::new(&d, index(1)).unwrap();
        let a: InstrumentId = "A".into();
        let b: InstrumentId = "B".into();

        assert_eq!(t.factor_loading(&a, index(0)).unwrap(), 4.0);
        assert_eq!(t.factor_loading(&b, index(1)).unwrap(), 3.0);
        assert!(matches!(
            t.factor_loading(&a, index(2)),
            Err(EigenError::OutOfRange(_))
        ));

        let truncated = t.truncated_factor_loadings(&b).unwrap();
        assert_eq!(truncated.view(), array![0.0, 3.0].view());
        assert!(t.truncated_factor_loadings(&"Z".into()).is_err());
        assert_eq!(t.keys().len(), 4);
    }

    #[test]
    fn test_truncated_eigenpairs_are_lazy_and_restartable() {
        let d = decomposition();
        let t = TruncatedEigendecomposition::with_restrictions(
            &d,
            &EigenExplainabilityRestrictions::with_max_eigenvectors(2).unwrap(),
        )
        .unwrap();

        let pairs = t.truncated_eigenpairs_descending();
        assert_eq!(pairs.len(), 2);
        let first: Vec<f64> = pairs.clone().map(|p| p.eigenvalue().value()).collect();
        let second: Vec<f64> = pairs.map(|p| p.eigenvalue().value()).collect();
        assert_eq!(first, vec![4.0, 3.0]);
        assert_eq!(first, second);
        assert_eq!(t.truncated_eigenpairs_descending().count(), 2);
    }
}
