//! Entity keys for the factor model.
//!
//! Every keyed structure in the model (return matrices, loadings, quality
//! and volatility maps) is generic over an [`Investable`] key. Keys are
//! foreign: structures compare and hash them but never own their meaning.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Capability set required of anything the model can key by.
pub trait Investable: Clone + Eq + Hash + Debug + Display {
    /// Stable identity of the entity, used in error messages and logs.
    fn investable_id(&self) -> String {
        self.to_string()
    }
}

/// Identifier of a tradable instrument.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From, Into,
)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Create an identifier from a symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// The underlying symbol.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InstrumentId {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

impl Investable for InstrumentId {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_instrument_id_identity() {
        let a = InstrumentId::new("AAPL");
        let b: InstrumentId = "AAPL".into();
        assert_eq!(a, b);
        assert_eq!(a.investable_id(), "AAPL");
        assert_eq!(a.as_str(), "AAPL");

        let set: HashSet<_> = [a, b, InstrumentId::new("MSFT")].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
