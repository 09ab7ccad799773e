//! Date-by-key labeled matrix.

use crate::error::{Result, ReturnsError};
use crate::investable::Investable;
use chrono::NaiveDate;
use ndarray::{Array2, ArrayView1};
use std::collections::HashMap;

/// A (date x key) matrix with labeled rows and columns.
///
/// Rows are strictly ascending dates, columns are unique keys, and the
/// shape of `values` is always `(dates.len(), keys.len())`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedMatrix<K, T> {
    dates: Vec<NaiveDate>,
    keys: Vec<K>,
    values: Array2<T>,
}

impl<K: Investable, T> DatedMatrix<K, T> {
    /// Create a labeled matrix.
    ///
    /// # Errors
    /// Returns an error if either axis is empty, the shape does not match
    /// the labels, dates are not strictly ascending, or a key repeats.
    pub fn new(dates: Vec<NaiveDate>, keys: Vec<K>, values: Array2<T>) -> Result<Self> {
        if dates.is_empty() {
            return Err(ReturnsError::Empty("matrix has no dates".to_string()));
        }
        if keys.is_empty() {
            return Err(ReturnsError::Empty("matrix has no keys".to_string()));
        }

        let (n_rows, n_cols) = values.dim();
        if n_rows != dates.len() {
            return Err(ReturnsError::DimensionMismatch {
                context: "matrix rows vs dates".to_string(),
                expected: dates.len(),
                actual: n_rows,
            });
        }
        if n_cols != keys.len() {
            return Err(ReturnsError::DimensionMismatch {
                context: "matrix columns vs keys".to_string(),
                expected: keys.len(),
                actual: n_cols,
            });
        }

        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(ReturnsError::UnorderedDates {
                previous: pair[0].to_string(),
                next: pair[1].to_string(),
            });
        }

        let mut seen = HashMap::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            if seen.insert(key, i).is_some() {
                return Err(ReturnsError::DuplicateKey(key.investable_id()));
            }
        }

        Ok(Self {
            dates,
            keys,
            values,
        })
    }

    /// Row labels.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column labels.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Cell values.
    pub const fn values(&self) -> &Array2<T> {
        &self.values
    }

    /// Number of rows.
    pub fn num_dates(&self) -> usize {
        self.dates.len()
    }

    /// Number of columns.
    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    /// Column index of a key.
    pub fn key_index(&self, key: &K) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    /// Column for a key, in date order.
    pub fn column(&self, key: &K) -> Option<ArrayView1<'_, T>> {
        self.key_index(key).map(|i| self.values.column(i))
    }
}

impl<K: Investable, T: Clone> DatedMatrix<K, T> {
    /// Reorder the columns to follow `order`.
    ///
    /// # Errors
    /// Returns [`ReturnsError::KeyMismatch`] unless `order` holds exactly the
    /// same keys as this matrix.
    pub fn with_key_order(&self, order: &[K]) -> Result<Self> {
        if order.len() != self.keys.len() {
            return Err(ReturnsError::KeyMismatch(format!(
                "expected {} keys, got {}",
                self.keys.len(),
                order.len()
            )));
        }

        let positions = order
            .iter()
            .map(|key| {
                self.key_index(key).ok_or_else(|| {
                    ReturnsError::KeyMismatch(format!("unknown key {}", key.investable_id()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let values = Array2::from_shape_fn(self.values.dim(), |(row, col)| {
            self.values[[row, positions[col]]].clone()
        });

        Self::new(self.dates.clone(), order.to_vec(), values)
    }
}
