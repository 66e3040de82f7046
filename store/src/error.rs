use std::time::Duration;
use thiserror::Error;

/// Why a collaborator could not answer.
///
/// Every variant is a transport-class failure: "can't tell", never "no".
/// An explicit "no such record" is [`Lookup::NotFound`], not an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("source timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected response from source: {0}")]
    Protocol(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result of a read that reached its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Found(v),
            None => Self::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
