use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use veritag_store::SourceError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    #[error("invalid base URL {0:?}")]
    InvalidBaseUrl(String),
}

/// Map a reqwest transport error onto the source taxonomy.
pub(crate) fn classify_transport(e: reqwest::Error, timeout: Duration) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout(timeout)
    } else if e.is_connect() {
        SourceError::Unavailable(format!("connection failed: {e}"))
    } else if e.is_decode() {
        SourceError::Protocol(format!("undecodable body: {e}"))
    } else {
        SourceError::Unavailable(e.to_string())
    }
}

/// Map a non-success, non-404 status onto the source taxonomy.
pub(crate) fn classify_status(status: StatusCode) -> SourceError {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        SourceError::Unavailable(format!("HTTP status {status}"))
    } else {
        SourceError::Protocol(format!("HTTP status {status}"))
    }
}

pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, GatewayError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(GatewayError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(trimmed.to_string())
}
