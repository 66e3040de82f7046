use thiserror::Error;
use veritag_types::{ProductId, TypesError};

use crate::state::AttemptState;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("malformed scan payload: {0}")]
    InputMalformed(#[source] TypesError),

    #[error("product {0} is not registered")]
    UnknownProduct(ProductId),

    #[error("illegal attempt transition {from:?} -> {to:?}")]
    IllegalTransition { from: AttemptState, to: AttemptState },

    #[error("could not build verdict: {0}")]
    Verdict(#[source] TypesError),
}
