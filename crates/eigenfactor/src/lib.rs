#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

// Re-export main types from sub-crates
pub use eigenfactor_model as model;
pub use eigenfactor_returns as returns;

// Re-export the types most callers need
pub use eigenfactor_model::{
    Angle, AngleInEigenspaceCalculator, EigenDimensionIndex, EigenError,
    EigenExplainabilityRestrictions, EigenSolver, Eigendecomposition,
    EigendecompositionCalculator, EigendecompositionConfig, FactorLoadings, RawEigenpair,
    TruncatedEigendecomposition,
};
pub use eigenfactor_returns::{
    DatedMatrix, InstrumentId, Investable, ReturnQuality, ReturnsError, ReturnsInMatrixForm,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
