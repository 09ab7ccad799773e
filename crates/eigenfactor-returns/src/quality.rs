//! Return quality tracking.
//!
//! Each observation in a return matrix is tagged as an actual return, a
//! gap-filled return (substituted during a halt, with real data on both
//! sides), or a back-filled return (substituted before the entity started
//! trading). Per entity, the tags must follow this transition graph:
//!
//! ```text
//! ACTUAL      -> ACTUAL | GAP_FILLED
//! GAP_FILLED  -> ACTUAL | GAP_FILLED
//! BACK_FILLED -> ACTUAL | BACK_FILLED
//! ```
//!
//! and every entity needs at least one actual observation.

use crate::error::{Result, ReturnsError};
use crate::investable::Investable;
use crate::returns::ReturnsInMatrixForm;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Provenance of a single return observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnQuality {
    /// Real market data
    Actual,
    /// Substituted during a trading halt
    GapFilled,
    /// Substituted before trading history began
    BackFilled,
}

impl ReturnQuality {
    /// Whether `next` may directly follow `self` in a time-ordered sequence.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Actual, Self::Actual | Self::GapFilled)
                | (Self::GapFilled, Self::Actual | Self::GapFilled)
                | (Self::BackFilled, Self::BackFilled | Self::Actual)
        )
    }
}

impl fmt::Display for ReturnQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actual => write!(f, "ACTUAL"),
            Self::GapFilled => write!(f, "GAP_FILLED"),
            Self::BackFilled => write!(f, "BACK_FILLED"),
        }
    }
}

/// Validate one entity's time-ordered quality sequence.
///
/// `label` and `date_of` only feed error messages.
pub(crate) fn validate_sequence<'a, I, D>(label: &str, qualities: I, date_of: D) -> Result<()>
where
    I: IntoIterator<Item = &'a ReturnQuality>,
    D: Fn(usize) -> String,
{
    let mut previous: Option<ReturnQuality> = None;
    let mut has_actual = false;

    for (i, &quality) in qualities.into_iter().enumerate() {
        if let Some(from) = previous
            && !from.can_transition_to(quality)
        {
            return Err(ReturnsError::InvalidQualityTransition {
                key: label.to_string(),
                date: date_of(i),
                from,
                to: quality,
            });
        }
        has_actual |= quality == ReturnQuality::Actual;
        previous = Some(quality);
    }

    if !has_actual {
        return Err(ReturnsError::NoActualReturns(label.to_string()));
    }
    Ok(())
}

/// Summary counts of one entity's return provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SingleItemQualityOfReturns {
    num_actual: usize,
    num_gap_filled: usize,
    num_back_filled: usize,
}

impl SingleItemQualityOfReturns {
    /// Create a summary from counts.
    ///
    /// # Errors
    /// Returns [`ReturnsError::NoActualReturns`] if the entity consists only
    /// of back-filled observations.
    pub fn new(num_actual: usize, num_gap_filled: usize, num_back_filled: usize) -> Result<Self> {
        if num_actual + num_gap_filled == 0 {
            return Err(ReturnsError::NoActualReturns(format!(
                "{num_back_filled} back-filled observations and nothing else"
            )));
        }
        Ok(Self {
            num_actual,
            num_gap_filled,
            num_back_filled,
        })
    }

    /// Validate a time-ordered sequence and count its states.
    pub fn from_sequence(qualities: &[ReturnQuality]) -> Result<Self> {
        validate_sequence("sequence", qualities, |i| format!("position {i}"))?;
        Ok(Self::count(qualities))
    }

    pub(crate) fn count<'a>(qualities: impl IntoIterator<Item = &'a ReturnQuality>) -> Self {
        let mut summary = Self {
            num_actual: 0,
            num_gap_filled: 0,
            num_back_filled: 0,
        };
        for quality in qualities {
            match quality {
                ReturnQuality::Actual => summary.num_actual += 1,
                ReturnQuality::GapFilled => summary.num_gap_filled += 1,
                ReturnQuality::BackFilled => summary.num_back_filled += 1,
            }
        }
        summary
    }

    /// Number of actual observations.
    pub const fn num_actual(&self) -> usize {
        self.num_actual
    }

    /// Number of gap-filled observations.
    pub const fn num_gap_filled(&self) -> usize {
        self.num_gap_filled
    }

    /// Number of back-filled observations.
    pub const fn num_back_filled(&self) -> usize {
        self.num_back_filled
    }

    /// Total number of observations.
    pub const fn num_total(&self) -> usize {
        self.num_actual + self.num_gap_filled + self.num_back_filled
    }

    /// Share of observations that were back-filled.
    pub fn back_filled_fraction(&self) -> f64 {
        self.num_back_filled as f64 / self.num_total() as f64
    }
}

/// Per-entity return quality summaries.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityOfReturns<K: Investable> {
    by_key: HashMap<K, SingleItemQualityOfReturns>,
}

impl<K: Investable> QualityOfReturns<K> {
    /// Wrap precomputed summaries.
    pub fn new(by_key: HashMap<K, SingleItemQualityOfReturns>) -> Result<Self> {
        if by_key.is_empty() {
            return Err(ReturnsError::Empty("quality of returns".to_string()));
        }
        Ok(Self { by_key })
    }

    /// Summarize every column of a validated return matrix.
    pub fn from_returns(returns: &ReturnsInMatrixForm<K>) -> Self {
        let quality = returns.quality().values();
        let by_key = returns
            .keys()
            .iter()
            .enumerate()
            .map(|(i, key)| {
                (
                    key.clone(),
                    SingleItemQualityOfReturns::count(quality.column(i)),
                )
            })
            .collect();
        Self { by_key }
    }

    /// Summary for one entity.
    pub fn get(&self, key: &K) -> Option<&SingleItemQualityOfReturns> {
        self.by_key.get(key)
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
