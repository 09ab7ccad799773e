//! Realized returns with per-cell provenance.

use crate::error::{Result, ReturnsError};
use crate::investable::Investable;
use crate::matrix::DatedMatrix;
use crate::quality::{ReturnQuality, validate_sequence};
use crate::value::ReturnValue;
use log::debug;
use std::collections::HashSet;

/// A (date x entity) matrix of realized returns, paired with a parallel
/// matrix tagging every cell's [`ReturnQuality`].
///
/// Immutable once built. Both matrices share the same dates and the same
/// column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsInMatrixForm<K: Investable> {
    returns: DatedMatrix<K, f64>,
    quality: DatedMatrix<K, ReturnQuality>,
}

impl<K: Investable> ReturnsInMatrixForm<K> {
    /// Pair a return matrix with its quality tags.
    ///
    /// The quality matrix may list its columns in a different order; it is
    /// realigned to the return matrix's column order.
    ///
    /// # Errors
    /// Returns an error if the dates or key sets differ, a cell is not a
    /// valid [`ReturnValue`], or any column's quality sequence breaks the
    /// transition rules or has no actual observation.
    pub fn new(
        returns: DatedMatrix<K, f64>,
        quality: DatedMatrix<K, ReturnQuality>,
    ) -> Result<Self> {
        if returns.dates() != quality.dates() {
            return Err(ReturnsError::KeyMismatch(format!(
                "return matrix has {} dates, quality matrix has {} dates, and they differ",
                returns.num_dates(),
                quality.num_dates()
            )));
        }

        let return_keys: HashSet<&K> = returns.keys().iter().collect();
        let quality_keys: HashSet<&K> = quality.keys().iter().collect();
        if return_keys != quality_keys {
            let mut missing: Vec<String> = return_keys
                .symmetric_difference(&quality_keys)
                .map(|k| k.investable_id())
                .collect();
            missing.sort();
            return Err(ReturnsError::KeyMismatch(format!(
                "keys present in only one matrix: {}",
                missing.join(", ")
            )));
        }

        let quality = if returns.keys() == quality.keys() {
            quality
        } else {
            quality.with_key_order(returns.keys())?
        };

        for &value in returns.values() {
            ReturnValue::new(value)?;
        }

        for (i, key) in returns.keys().iter().enumerate() {
            let dates = returns.dates();
            validate_sequence(&key.investable_id(), quality.values().column(i), |row| {
                dates[row].to_string()
            })?;
        }

        debug!(
            "Validated returns for {} entities over {} dates",
            returns.num_keys(),
            returns.num_dates()
        );

        Ok(Self { returns, quality })
    }

    /// The realized returns.
    pub const fn returns(&self) -> &DatedMatrix<K, f64> {
        &self.returns
    }

    /// The quality tags, aligned with [`Self::returns`].
    pub const fn quality(&self) -> &DatedMatrix<K, ReturnQuality> {
        &self.quality
    }

    /// Entities, in column order.
    pub fn keys(&self) -> &[K] {
        self.returns.keys()
    }

    /// Quality tag of one cell.
    pub fn quality_at(&self, row: usize, key: &K) -> Option<ReturnQuality> {
        let col = self.returns.key_index(key)?;
        self.quality.values().get([row, col]).copied()
    }
}
