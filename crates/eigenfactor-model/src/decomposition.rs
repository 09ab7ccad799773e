//! The eigendecomposition aggregate.
//!
//! Binds the retained eigenpairs to per-entity factor loadings, return
//! quality and realized volatility, and checks that all of them agree with
//! each other. Once built, the aggregate is a read-only fact table; the
//! only later mutation is a one-time attachment of additional loadings for
//! synthetic entities.

use crate::dimension::EigenDimensionIndex;
use crate::eigen::Eigenpair;
use crate::error::{EigenError, Result};
use crate::explainability::EigenExplainabilityFraction;
use crate::loadings::{FactorLoadings, InstrumentLoadings};
use eigenfactor_returns::{Investable, QualityOfReturns, RealizedVolatilities};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

/// How strictly eigenvector length is tied to the number of entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EigenvectorLengthPolicy {
    /// Every eigenvector has one coordinate per entity
    #[default]
    MatchInstrumentCount,
    /// Entities were filtered after the eigenvectors were computed, so
    /// eigenvectors only need to agree with each other
    AllowPrefiltered,
}

/// Everything needed to build an [`Eigendecomposition`].
#[derive(Debug, Clone)]
pub struct EigendecompositionInputs<K: Investable> {
    /// Human-readable description
    pub description: String,
    /// Fraction of total variance explained by the retained eigenpairs
    pub explainability_fraction: f64,
    /// Sum of all eigenvalues, including those not retained
    pub sum_of_all_eigenvalues: f64,
    /// Retained eigenpairs, largest eigenvalue first
    pub eigenpairs_descending: Vec<Eigenpair>,
    /// Loadings of every entity
    pub loadings: Vec<InstrumentLoadings<K>>,
    /// Return provenance of every entity
    pub quality_of_returns: QualityOfReturns<K>,
    /// Realized volatility of every entity
    pub realized_volatilities: RealizedVolatilities<K>,
    /// Eigenvector length check
    pub eigenvector_length_policy: EigenvectorLengthPolicy,
}

/// Loadings for entities that are not part of the eigendecomposition, such
/// as a hypothetical instrument tracking a model index.
///
/// Write-once. The single write must complete before the owning
/// [`Eigendecomposition`] is shared with readers; [`OnceLock`] makes a
/// completed write visible to every thread that observes it, but a reader
/// racing the write may still see "not set" and fall through to `None`.
#[derive(Debug, Clone)]
pub struct AdditionalFactorLoadings<K: Investable> {
    cell: OnceLock<HashMap<K, FactorLoadings>>,
}

impl<K: Investable> Default for AdditionalFactorLoadings<K> {
    fn default() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }
}

impl<K: Investable> AdditionalFactorLoadings<K> {
    /// Attach the loadings. Every vector must have `expected_len` factors.
    fn set(&self, loadings: HashMap<K, FactorLoadings>, expected_len: usize) -> Result<()> {
        if self.cell.get().is_some() {
            return Err(EigenError::AlreadySet);
        }
        if let Some((key, l)) = loadings.iter().find(|(_, l)| l.len() != expected_len) {
            return Err(EigenError::DimensionMismatch {
                context: format!("additional loadings for {}", key.investable_id()),
                expected: expected_len,
                actual: l.len(),
            });
        }
        self.cell.set(loadings).map_err(|_| EigenError::AlreadySet)
    }

    /// Loadings for `key`, if attached.
    pub fn get(&self, key: &K) -> Option<&FactorLoadings> {
        self.cell.get().and_then(|m| m.get(key))
    }

    /// Whether the loadings were attached.
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The attached map.
    pub fn as_map(&self) -> Option<&HashMap<K, FactorLoadings>> {
        self.cell.get()
    }
}

/// Truncated eigendecomposition of an entity correlation matrix.
#[derive(Debug, Clone)]
pub struct Eigendecomposition<K: Investable> {
    description: String,
    explainability_fraction: EigenExplainabilityFraction,
    sum_of_all_eigenvalues: f64,
    eigenpairs_descending: Vec<Eigenpair>,
    keys: Vec<K>,
    loadings: HashMap<K, FactorLoadings>,
    quality_of_returns: QualityOfReturns<K>,
    realized_volatilities: RealizedVolatilities<K>,
    additional_loadings: AdditionalFactorLoadings<K>,
}

impl<K: Investable> Eigendecomposition<K> {
    /// Validate and assemble an eigendecomposition.
    ///
    /// # Errors
    /// Returns an error if there are no eigenpairs or no entities, an
    /// eigenvector's length disagrees with the others or with the entity
    /// count, eigenvalues are not strictly descending, a loadings vector
    /// does not have one value per eigenpair, the explainability fraction
    /// is not strictly between 0 and 1, the retained eigenvalues do not sum
    /// to less than all eigenvalues, or the loadings, quality and volatility
    /// collections cover different entities.
    pub fn new(inputs: EigendecompositionInputs<K>) -> Result<Self> {
        let EigendecompositionInputs {
            description,
            explainability_fraction,
            sum_of_all_eigenvalues,
            eigenpairs_descending,
            loadings,
            quality_of_returns,
            realized_volatilities,
            eigenvector_length_policy,
        } = inputs;

        if eigenpairs_descending.is_empty() {
            return Err(EigenError::Empty("no retained eigenpairs".to_string()));
        }
        if loadings.is_empty() {
            return Err(EigenError::Empty("no entities".to_string()));
        }
        let num_entities = loadings.len();
        let num_eigenpairs = eigenpairs_descending.len();

        check_eigenvector_lengths(&eigenpairs_descending, num_entities, eigenvector_length_policy)?;
        check_descending(&eigenpairs_descending)?;

        let mut keys = Vec::with_capacity(num_entities);
        let mut by_key = HashMap::with_capacity(num_entities);
        for InstrumentLoadings {
            instrument,
            loadings,
        } in loadings
        {
            if loadings.len() != num_eigenpairs {
                return Err(EigenError::DimensionMismatch {
                    context: format!("loadings for {}", instrument.investable_id()),
                    expected: num_eigenpairs,
                    actual: loadings.len(),
                });
            }
            if by_key.insert(instrument.clone(), loadings).is_some() {
                return Err(EigenError::KeyMismatch(format!(
                    "duplicate loadings for {}",
                    instrument.investable_id()
                )));
            }
            keys.push(instrument);
        }

        let explainability_fraction = EigenExplainabilityFraction::new(explainability_fraction)?;

        let retained_sum: f64 = eigenpairs_descending
            .iter()
            .map(|p| p.eigenvalue().value())
            .sum();
        if retained_sum.partial_cmp(&sum_of_all_eigenvalues) != Some(Ordering::Less) {
            return Err(EigenError::OutOfRange(format!(
                "retained eigenvalues sum to {retained_sum}, \
                 which is not below the sum of all eigenvalues {sum_of_all_eigenvalues}"
            )));
        }

        let loading_keys: HashSet<&K> = keys.iter().collect();
        check_same_keys("quality of returns", &loading_keys, quality_of_returns.keys())?;
        check_same_keys("realized volatilities", &loading_keys, realized_volatilities.keys())?;

        debug!(
            "Built eigendecomposition '{description}' with {num_eigenpairs} eigenpairs \
             over {num_entities} entities ({explainability_fraction} explained)"
        );

        Ok(Self {
            description,
            explainability_fraction,
            sum_of_all_eigenvalues,
            eigenpairs_descending,
            keys,
            loadings: by_key,
            quality_of_returns,
            realized_volatilities,
            additional_loadings: AdditionalFactorLoadings::default(),
        })
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Fraction of variance explained by the retained eigenpairs.
    pub const fn explainability_fraction(&self) -> EigenExplainabilityFraction {
        self.explainability_fraction
    }

    /// Sum of all eigenvalues, including those not retained.
    pub const fn sum_of_all_eigenvalues(&self) -> f64 {
        self.sum_of_all_eigenvalues
    }

    /// Sum of the retained eigenvalues.
    pub fn sum_of_retained_eigenvalues(&self) -> f64 {
        self.eigenpairs_descending
            .iter()
            .map(|p| p.eigenvalue().value())
            .sum()
    }

    /// Number of retained eigenpairs.
    pub fn num_retained_eigenpairs(&self) -> usize {
        self.eigenpairs_descending.len()
    }

    /// Retained eigenpairs, largest eigenvalue first.
    pub fn eigenpairs_in_descending_eigenvalues(&self) -> &[Eigenpair] {
        &self.eigenpairs_descending
    }

    /// Entities, in the order their loadings were supplied.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Number of entities.
    pub fn num_entities(&self) -> usize {
        self.keys.len()
    }

    /// Loadings for `key`, falling back to the additional loadings when the
    /// entity is not part of the decomposition.
    pub fn factor_loadings(&self, key: &K) -> Option<&FactorLoadings> {
        self.loadings
            .get(key)
            .or_else(|| self.additional_loadings.get(key))
    }

    /// Loading of `key` on one retained dimension.
    ///
    /// # Errors
    /// Returns an error if `dimension` is not a retained dimension or the
    /// entity has no loadings.
    pub fn factor_loading(&self, key: &K, dimension: EigenDimensionIndex) -> Result<f64> {
        if dimension.index() >= self.num_retained_eigenpairs() {
            return Err(EigenError::OutOfRange(format!(
                "{dimension} is beyond the {} retained eigenpairs",
                self.num_retained_eigenpairs()
            )));
        }
        self.factor_loadings(key)
            .and_then(|l| l.get(dimension.index()))
            .ok_or_else(|| {
                EigenError::KeyMismatch(format!("no loadings for {}", key.investable_id()))
            })
    }

    /// Loadings of every entity in key order, labeled.
    pub fn instrument_loadings(&self) -> impl Iterator<Item = (&K, &FactorLoadings)> {
        self.keys.iter().map(|k| (k, &self.loadings[k]))
    }

    /// Return provenance per entity.
    pub const fn quality_of_returns(&self) -> &QualityOfReturns<K> {
        &self.quality_of_returns
    }

    /// Realized volatility per entity.
    pub const fn realized_volatilities(&self) -> &RealizedVolatilities<K> {
        &self.realized_volatilities
    }

    /// Realized volatility of one entity.
    pub fn realized_volatility(&self, key: &K) -> Option<f64> {
        self.realized_volatilities.get(key)
    }

    /// Attach loadings for entities outside the decomposition.
    ///
    /// Must be called at most once, during setup and before the
    /// decomposition is read concurrently.
    ///
    /// # Errors
    /// Returns [`EigenError::AlreadySet`] on a second call, or an error if a
    /// vector does not have one value per retained eigenpair.
    pub fn set_additional_factor_loadings(
        &self,
        loadings: HashMap<K, FactorLoadings>,
    ) -> Result<()> {
        let shadowed: Vec<String> = loadings
            .keys()
            .filter(|k| self.loadings.contains_key(k))
            .map(Investable::investable_id)
            .collect();
        if !shadowed.is_empty() {
            warn!(
                "Additional loadings for {} will never be used; primary loadings exist",
                shadowed.join(", ")
            );
        }
        self.additional_loadings
            .set(loadings, self.num_retained_eigenpairs())
    }

    /// The additional loadings slot.
    pub const fn additional_factor_loadings(&self) -> &AdditionalFactorLoadings<K> {
        &self.additional_loadings
    }

    /// Same decomposition with every eigenvector dropped.
    ///
    /// Loadings, eigenvalues and metadata are kept; only the per-entity
    /// eigenvector coordinates go.
    #[must_use]
    pub fn into_eigenvalues_only(mut self) -> Self {
        self.eigenpairs_descending = self
            .eigenpairs_descending
            .iter()
            .map(Eigenpair::without_eigenvector)
            .collect();
        self
    }
}

impl<K: Investable> fmt::Display for Eigendecomposition<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} eigenpairs over {} entities, {} explained",
            self.description,
            self.num_retained_eigenpairs(),
            self.num_entities(),
            self.explainability_fraction
        )
    }
}

fn check_eigenvector_lengths(
    eigenpairs: &[Eigenpair],
    num_entities: usize,
    policy: EigenvectorLengthPolicy,
) -> Result<()> {
    let mut common_len: Option<usize> = None;
    for (i, eigenvector) in eigenpairs
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.eigenvector().map(|v| (i, v)))
    {
        if policy == EigenvectorLengthPolicy::MatchInstrumentCount && eigenvector.len() != num_entities
        {
            return Err(EigenError::DimensionMismatch {
                context: format!("eigenvector {i} vs entity count"),
                expected: num_entities,
                actual: eigenvector.len(),
            });
        }
        match common_len {
            Some(len) if len != eigenvector.len() => {
                return Err(EigenError::DimensionMismatch {
                    context: format!("eigenvector {i} vs eigenvector 0"),
                    expected: len,
                    actual: eigenvector.len(),
                });
            }
            Some(_) => {}
            None => common_len = Some(eigenvector.len()),
        }
    }
    Ok(())
}

fn check_descending(eigenpairs: &[Eigenpair]) -> Result<()> {
    match eigenpairs
        .windows(2)
        .find(|p| p[0].eigenvalue().value() <= p[1].eigenvalue().value())
    {
        Some(p) => Err(EigenError::Ordering(format!(
            "eigenvalues must be strictly descending: {} is followed by {}",
            p[0].eigenvalue(),
            p[1].eigenvalue()
        ))),
        None => Ok(()),
    }
}

fn check_same_keys<'a, K: Investable + 'a>(
    what: &str,
    expected: &HashSet<&K>,
    actual: impl Iterator<Item = &'a K>,
) -> Result<()> {
    let actual: HashSet<&K> = actual.collect();
    if &actual == expected {
        return Ok(());
    }
    let mut differing: Vec<String> = expected
        .symmetric_difference(&actual)
        .map(|k| k.investable_id())
        .collect();
    differing.sort();
    Err(EigenError::KeyMismatch(format!(
        "{what} and loadings differ on: {}",
        differing.join(", ")
    )))
}
