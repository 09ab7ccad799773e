//! Error types for return matrices and return statistics.

use crate::quality::ReturnQuality;
use thiserror::Error;

/// Result type for return operations.
pub type Result<T> = std::result::Result<T, ReturnsError>;

/// Errors that can occur while building or summarizing return matrices.
#[derive(Debug, Error)]
pub enum ReturnsError {
    /// Invalid individual return value
    #[error("Invalid return value: {0}")]
    InvalidReturn(f64),

    /// Empty input
    #[error("Empty input: {0}")]
    Empty(String),

    /// Dimension mismatch
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which structure the mismatch was found in
        context: String,
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Row or column keys differ between two matrices that must line up
    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    /// Dates are not strictly ascending
    #[error("Dates must be strictly ascending: {previous} is followed by {next}")]
    UnorderedDates {
        /// Earlier position's date
        previous: String,
        /// Later position's date
        next: String,
    },

    /// Duplicate column key
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// A quality sequence moved between two states that cannot follow each other
    #[error("Invalid return quality transition for {key} on {date}: {from} -> {to}")]
    InvalidQualityTransition {
        /// Entity whose sequence is invalid
        key: String,
        /// Date of the offending observation
        date: String,
        /// Previous state
        from: ReturnQuality,
        /// Next state
        to: ReturnQuality,
    },

    /// An entity has no actual observations
    #[error("No actual returns for {0}")]
    NoActualReturns(String),

    /// Insufficient data for a statistic
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Statistic is undefined for the given data
    #[error("Invalid statistic: {0}")]
    InvalidStatistic(String),
}
