#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod angle;
pub mod calculator;
pub mod coverage;
pub mod decomposition;
pub mod dimension;
pub mod eigen;
pub mod error;
pub mod explainability;
pub mod loadings;
pub mod truncation;

// Re-export main types
pub use angle::{Angle, AngleInEigenspaceCalculator, RawAngleCalculator};
pub use calculator::{
    EigenSolver, EigendecompositionCalculator, EigendecompositionConfig, RawEigenpair,
};
pub use coverage::CoverageCalculator;
pub use decomposition::{
    AdditionalFactorLoadings, Eigendecomposition, EigendecompositionInputs,
    EigenvectorLengthPolicy,
};
pub use dimension::EigenDimensionIndex;
pub use eigen::{Eigenpair, Eigenvalue, Eigenvector};
pub use error::{EigenError, Result};
pub use explainability::{EigenExplainabilityFraction, EigenExplainabilityRestrictions};
pub use loadings::{FactorLoadings, FactorLoadingsCalculator, InstrumentLoadings};
pub use truncation::{MaximumEigenDimensionIndexCalculator, TruncatedEigendecomposition};
