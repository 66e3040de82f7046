//! Error type for constructing and validating shared values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TypesError {
    #[error("verification request is missing a product id")]
    MissingProductId,

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("a verdict must carry at least one reason")]
    EmptyReasons,

    #[error("confidence {0} is outside [0, 1]")]
    ConfidenceOutOfRange(f64),

    #[error("unknown product category: {0}")]
    UnknownCategory(String),
}
