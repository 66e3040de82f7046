//! RPC error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use veritag_node::NodeError;
use veritag_verification::VerificationError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("product not found: {0}")]
    ProductNotFound(u64),

    #[error("verification record not found: {0}")]
    RecordNotFound(u64),

    #[error("metrics are disabled")]
    MetricsDisabled,

    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    #[error("server error: {0}")]
    Server(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::ProductNotFound(_)
            | RpcError::RecordNotFound(_)
            | RpcError::MetricsDisabled => StatusCode::NOT_FOUND,
            RpcError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NodeError> for RpcError {
    fn from(e: NodeError) -> Self {
        match e {
            NodeError::Verification(VerificationError::InputMalformed(inner)) => {
                RpcError::InvalidRequest(inner.to_string())
            }
            NodeError::Verification(VerificationError::UnknownProduct(id)) => {
                RpcError::ProductNotFound(id.get())
            }
            NodeError::Source(inner) => RpcError::Unavailable(inner.to_string()),
            other => RpcError::Server(other.to_string()),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
