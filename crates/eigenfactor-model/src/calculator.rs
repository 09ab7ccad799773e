//! Building an [`Eigendecomposition`] from return data.
//!
//! The eigensolver itself is supplied by the caller through [`EigenSolver`];
//! this module only orders, filters and validates what it returns.

use crate::coverage::CoverageCalculator;
use crate::decomposition::{Eigendecomposition, EigendecompositionInputs, EigenvectorLengthPolicy};
use crate::eigen::{Eigenpair, Eigenvalue, Eigenvector};
use crate::error::{EigenError, Result};
use crate::loadings::FactorLoadingsCalculator;
use eigenfactor_returns::{
    Investable, QualityOfReturns, RealizedVolatilities, ReturnsInMatrixForm, correlation_matrix,
};
use log::{debug, trace};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// One eigenvalue/eigenvector pair as produced by an eigensolver, in no
/// particular order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEigenpair {
    /// Eigenvalue
    pub eigenvalue: f64,
    /// Eigenvector, one coordinate per matrix row
    pub eigenvector: Array1<f64>,
}

/// Symmetric eigensolver used to decompose correlation matrices.
pub trait EigenSolver {
    /// All eigenpairs of the symmetric matrix `matrix`, in any order.
    fn solve(&self, matrix: &Array2<f64>) -> Result<Vec<RawEigenpair>>;
}

/// Eigendecomposition calculator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EigendecompositionConfig {
    /// Minimum fraction of positive eigenvalue mass to retain (default: 0.8)
    pub min_coverage_fraction: f64,

    /// Eigenvector length check (default: one coordinate per entity)
    pub eigenvector_length_policy: EigenvectorLengthPolicy,

    /// Scale applied to sample standard deviations to get realized
    /// volatilities (default: sqrt(252) for daily returns)
    pub volatility_annualization_factor: f64,
}

impl Default for EigendecompositionConfig {
    fn default() -> Self {
        Self {
            min_coverage_fraction: 0.8,
            eigenvector_length_policy: EigenvectorLengthPolicy::MatchInstrumentCount,
            volatility_annualization_factor: (252.0_f64).sqrt(),
        }
    }
}

impl EigendecompositionConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        let coverage = self.min_coverage_fraction;
        if coverage.is_nan() || coverage <= 0.0 || coverage > 1.0 {
            return Err(EigenError::InvalidConfig(format!(
                "min_coverage_fraction {coverage} must be in (0, 1]"
            )));
        }
        let factor = self.volatility_annualization_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(EigenError::InvalidConfig(format!(
                "volatility_annualization_factor {factor} must be positive"
            )));
        }
        Ok(())
    }
}

/// Builds an [`Eigendecomposition`] from a return matrix.
///
/// 1. correlation matrix of the returns
/// 2. eigenpairs from the solver, sorted ascending
/// 3. top eigenpairs reaching the minimum coverage
/// 4. loadings of every entity on those eigenpairs
/// 5. return quality and realized volatility per entity
#[derive(Debug)]
pub struct EigendecompositionCalculator {
    config: EigendecompositionConfig,
    coverage: CoverageCalculator,
    loadings: FactorLoadingsCalculator,
}

impl EigendecompositionCalculator {
    /// Create a calculator with the given configuration.
    pub fn new(config: EigendecompositionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            coverage: CoverageCalculator::new(),
            loadings: FactorLoadingsCalculator::new(),
        })
    }

    /// Create with default configuration.
    ///
    /// # Errors
    /// Returns an error if the default configuration is invalid (should not happen).
    pub fn try_default() -> Result<Self> {
        Self::new(EigendecompositionConfig::default())
    }

    /// The configuration in use.
    pub const fn config(&self) -> &EigendecompositionConfig {
        &self.config
    }

    /// Decompose the correlation structure of `returns`.
    ///
    /// # Errors
    /// Propagates correlation, solver, coverage and construction errors. In
    /// particular, if every eigenpair is needed to reach the coverage target
    /// the explainability fraction would be 1 and construction fails.
    pub fn calculate<K, S>(
        &self,
        description: impl Into<String>,
        returns: &ReturnsInMatrixForm<K>,
        solver: &S,
    ) -> Result<Eigendecomposition<K>>
    where
        K: Investable,
        S: EigenSolver + ?Sized,
    {
        let correlation = correlation_matrix(returns.returns().values())?;
        trace!("Correlation matrix {:?}", correlation.dim());

        let mut raw = solver.solve(&correlation)?;
        if raw.is_empty() {
            return Err(EigenError::Empty("solver returned no eigenpairs".to_string()));
        }
        if let Some(bad) = raw.iter().find(|p| !p.eigenvalue.is_finite()) {
            return Err(EigenError::InvalidEigenvalue(bad.eigenvalue));
        }
        raw.sort_by(|a, b| a.eigenvalue.total_cmp(&b.eigenvalue));

        let ascending: Vec<f64> = raw.iter().map(|p| p.eigenvalue).collect();
        let num_retained = self
            .coverage
            .num_eigenpairs_for_minimum_coverage(&ascending, self.config.min_coverage_fraction)?;
        let positive_sum = self.coverage.positive_eigenvalue_sum(&ascending)?;
        let sum_of_all_eigenvalues: f64 = ascending.iter().rev().sum();

        let eigenpairs = raw
            .into_iter()
            .rev()
            .take(num_retained)
            .map(|p| {
                Ok(Eigenpair::new(
                    Eigenvalue::positive(p.eigenvalue)?,
                    Eigenvector::new(p.eigenvector)?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let retained_sum: f64 = eigenpairs.iter().map(|p| p.eigenvalue().value()).sum();
        let explainability_fraction = retained_sum / positive_sum;
        debug!(
            "Retaining {num_retained} of {} eigenpairs, explaining {explainability_fraction:.4}",
            ascending.len()
        );

        let loadings = self.loadings.calculate_factor_loadings_by_instrument(
            &correlation,
            &eigenpairs,
            returns.keys(),
        )?;

        Eigendecomposition::new(EigendecompositionInputs {
            description: description.into(),
            explainability_fraction,
            sum_of_all_eigenvalues,
            eigenpairs_descending: eigenpairs,
            loadings,
            quality_of_returns: QualityOfReturns::from_returns(returns),
            realized_volatilities: RealizedVolatilities::from_returns(
                returns,
                self.config.volatility_annualization_factor,
            )?,
            eigenvector_length_policy: self.config.eigenvector_length_policy,
        })
    }
}
