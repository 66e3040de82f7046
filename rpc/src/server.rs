//! Axum-based RPC server.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use veritag_node::{NodeMetrics, ShutdownController, VerificationService, VeritagNode};

use crate::error::RpcError;
use crate::handlers;

/// State shared by every handler.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<VerificationService>,
    /// `None` when the metrics endpoint is disabled.
    pub metrics: Option<Arc<NodeMetrics>>,
    pub shutdown: ShutdownController,
}

impl ApiState {
    pub fn for_node(node: &VeritagNode, shutdown: ShutdownController) -> Self {
        Self {
            service: node.service.clone(),
            metrics: node
                .config
                .enable_metrics
                .then(|| node.metrics.clone()),
            shutdown,
        }
    }
}

/// Build the HTTP router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/v1/verifications", post(handlers::submit_verification))
        .route(
            "/v1/verifications/:record_id",
            get(handlers::get_verification),
        )
        .route(
            "/v1/verifications/product/:product_id",
            get(handlers::product_history),
        )
        .route(
            "/v1/verifications/analyze/:product_id",
            post(handlers::analyze_product),
        )
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub bind_addr: String,
}

impl RpcServer {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
        }
    }

    /// Serve the API until `state.shutdown` fires, then drain open
    /// connections.
    pub async fn start(&self, state: ApiState) -> Result<(), RpcError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {}: {e}", self.bind_addr)))?;
        info!(addr = %self.bind_addr, "HTTP API listening");
        serve(listener, state).await
    }
}

/// Serve the API on an already bound listener.
pub async fn serve(listener: TcpListener, state: ApiState) -> Result<(), RpcError> {
    let shutdown = state.shutdown.triggered();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("HTTP API draining");
        })
        .await
        .map_err(|e| RpcError::Server(e.to_string()))
}
