//! Error types for the eigendecomposition model.

use eigenfactor_returns::ReturnsError;
use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, EigenError>;

/// Errors raised while building or reading an eigendecomposition.
///
/// All of these are precondition violations: the call that raised one has
/// no partial effect.
#[derive(Debug, Error)]
pub enum EigenError {
    /// Return data error
    #[error("Returns error: {0}")]
    Returns(#[from] ReturnsError),

    /// Invalid eigenvalue
    #[error("Invalid eigenvalue: {0}")]
    InvalidEigenvalue(f64),

    /// Eigenvector is empty or not of unit length
    #[error("Invalid eigenvector: {0}")]
    InvalidEigenvector(String),

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

    /// Values are not in the required order
    #[error("Ordering violation: {0}")]
    Ordering(String),

    /// Value outside its allowed range
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Key sets of per-entity collections differ
    #[error("Key mismatch: {0}")]
    KeyMismatch(String),

    /// Angle is undefined for the given vectors
    #[error("Undefined angle: {0}")]
    UndefinedAngle(String),

    /// Requested coverage cannot be reached
    #[error("Coverage of {target} is unreachable; reached {reached}")]
    CoverageUnreachable {
        /// Requested coverage fraction
        target: f64,
        /// Fraction reached after using every positive eigenvalue
        reached: f64,
    },

    /// Additional factor loadings were already attached
    #[error("Additional factor loadings are already set")]
    AlreadySet,

    /// Requested feature is not implemented
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
