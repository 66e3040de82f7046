//! Pre-built [`tracing::Span`] constructors for common VeriTag operations.
//!
//! Using consistent span names and field sets across the codebase makes it
//! easy to filter, search, and correlate traces.

use tracing::{info_span, Span};

/// Span covering one verification request handled by the service.
pub fn verification_request_span(product_id: u64, verifier_id: Option<u64>) -> Span {
    info_span!("verification_request", product = product_id, verifier = ?verifier_id)
}

/// Span covering the ledger anchoring of a finished verification.
pub fn ledger_anchor_span(product_id: u64) -> Span {
    info_span!("ledger_anchor", product = product_id)
}

/// Span covering a single HTTP request handled by the API server.
pub fn http_request_span(method: &str, path: &str) -> Span {
    info_span!("http_request", method = %method, path = %path)
}

/// Span covering a dry-run analysis of one product.
pub fn product_analysis_span(product_id: u64) -> Span {
    info_span!("product_analysis", product = product_id)
}
