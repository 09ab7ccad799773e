#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod investable;
pub mod matrix;
pub mod quality;
pub mod returns;
pub mod statistics;
pub mod value;

pub use error::{Result, ReturnsError};
pub use investable::{InstrumentId, Investable};
pub use matrix::DatedMatrix;
pub use quality::{QualityOfReturns, ReturnQuality, SingleItemQualityOfReturns};
pub use returns::ReturnsInMatrixForm;
pub use statistics::{RealizedVolatilities, StandardDeviationsCalculator, correlation_matrix};
pub use value::ReturnValue;
