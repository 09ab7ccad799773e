//! Index of a retained principal component.

use crate::error::{EigenError, Result};
use std::fmt;

/// Index of the n-th retained eigen-dimension, 0-based and at most
/// [`EigenDimensionIndex::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EigenDimensionIndex(usize);

impl EigenDimensionIndex {
    /// Largest valid index.
    pub const MAX: usize = 500;

    /// The first (largest-eigenvalue) dimension.
    pub const FIRST: Self = Self(0);

    /// Validate and wrap an index.
    ///
    /// # Errors
    /// Returns [`EigenError::OutOfRange`] above [`Self::MAX`].
    pub fn new(index: usize) -> Result<Self> {
        if index > Self::MAX {
            return Err(EigenError::OutOfRange(format!(
                "eigen-dimension index {index} exceeds {}",
                Self::MAX
            )));
        }
        Ok(Self(index))
    }

    /// The raw index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for EigenDimensionIndex {
    type Error = EigenError;

    fn try_from(index: usize) -> Result<Self> {
        Self::new(index)
    }
}

impl fmt::Display for EigenDimensionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PC{}", self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(EigenDimensionIndex::new(0).unwrap(), EigenDimensionIndex::FIRST);
        assert_eq!(EigenDimensionIndex::new(500).unwrap().index(), 500);
        assert!(EigenDimensionIndex::new(501).is_err());
        assert_eq!(EigenDimensionIndex::new(2).unwrap().to_string(), "PC3");
    }
}
