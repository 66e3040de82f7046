//! RPC request handlers.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use veritag_node::tracing_spans::http_request_span;
use veritag_node::{AnalyzeCommand, ProductAnalysis, VerificationResponse, VerifyCommand};
use veritag_store::{Lookup, StoredVerification};
use veritag_types::{ProductId, RecordId};

use crate::error::RpcError;
use crate::server::ApiState;

/// Content type of the Prometheus text exposition format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

// ── Verification ─────────────────────────────────────────────────────────

/// `POST /v1/verifications`
///
/// In-flight checks are cancelled when the node shuts down or the client
/// disconnects; the partial verdict is still recorded.
pub async fn submit_verification(
    State(state): State<ApiState>,
    Json(command): Json<VerifyCommand>,
) -> Result<Json<VerificationResponse>, RpcError> {
    let cancel = state.shutdown.subscribe();
    let response = state
        .service
        .verify_with_cancel(command, cancel)
        .instrument(http_request_span("POST", "/v1/verifications"))
        .await?;
    Ok(Json(response))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub product_id: u64,
    pub verifications: Vec<StoredVerification>,
}

/// `GET /v1/verifications/product/:product_id`
pub async fn product_history(
    State(state): State<ApiState>,
    Path(product_id): Path<u64>,
) -> Result<Json<HistoryResponse>, RpcError> {
    if product_id == 0 {
        return Err(RpcError::InvalidRequest("product id must be positive".into()));
    }
    let verifications = state
        .service
        .history(ProductId::new(product_id))
        .instrument(http_request_span("GET", "/v1/verifications/product"))
        .await?;
    Ok(Json(HistoryResponse {
        product_id,
        verifications,
    }))
}

/// `GET /v1/verifications/:record_id`
pub async fn get_verification(
    State(state): State<ApiState>,
    Path(record_id): Path<u64>,
) -> Result<Json<StoredVerification>, RpcError> {
    match state
        .service
        .record(RecordId::new(record_id))
        .instrument(http_request_span("GET", "/v1/verifications"))
        .await?
    {
        Lookup::Found(stored) => Ok(Json(stored)),
        Lookup::NotFound => Err(RpcError::RecordNotFound(record_id)),
    }
}

/// `POST /v1/verifications/analyze/:product_id`
///
/// Runs every check without recording or anchoring the outcome. The body is
/// optional.
pub async fn analyze_product(
    State(state): State<ApiState>,
    Path(product_id): Path<u64>,
    command: Option<Json<AnalyzeCommand>>,
) -> Result<Json<ProductAnalysis>, RpcError> {
    if product_id == 0 {
        return Err(RpcError::InvalidRequest("product id must be positive".into()));
    }
    let command = command.map(|Json(c)| c).unwrap_or_default();
    let analysis = state
        .service
        .analyze(ProductId::new(product_id), command)
        .instrument(http_request_span("POST", "/v1/verifications/analyze"))
        .await?;
    Ok(Json(analysis))
}

// ── Node ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// `GET /metrics`
pub async fn metrics(State(state): State<ApiState>) -> Result<impl IntoResponse, RpcError> {
    let metrics = state.metrics.as_ref().ok_or(RpcError::MetricsDisabled)?;
    let body = metrics
        .encode()
        .map_err(|e| RpcError::Server(format!("failed to encode metrics: {e}")))?;
    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
