//! HTTP API routes against nullable collaborators.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use veritag_node::{NodeMetrics, ShutdownController, VerificationService};
use veritag_nullables::{NullClock, NullContentStore, NullLedger, NullRegistry};
use veritag_rpc::{router, serve, ApiState};
use veritag_store::{LedgerRecord, ProductDocument};
use veritag_types::{
    LedgerId, Manufacturer, ManufacturerId, ProductCategory, ProductId, ProductSnapshot, Timestamp,
};
use veritag_verification::{Collaborators, VerificationOrchestrator};

const QR: &str = "5e0f1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7";

fn state(with_metrics: bool) -> ApiState {
    let registry = Arc::new(NullRegistry::new());
    let ledger = Arc::new(NullLedger::new());
    let content = Arc::new(NullContentStore::new());

    let mut snapshot = ProductSnapshot {
        id: ProductId::new(21),
        name: "Leather Wallet".into(),
        description: "Hand-stitched bifold".into(),
        manufacturing_date: Timestamp::new(1_730_000_000),
        batch_number: "LW-0921".into(),
        category: ProductCategory::LuxuryGoods,
        manufacturer_id: ManufacturerId::new(6),
        qr_hash: QR.into(),
        content_hash: None,
        ledger_id: Some(LedgerId::new(70)),
        is_active: true,
    };
    let document = ProductDocument::from_snapshot(&snapshot).to_bytes().unwrap();
    snapshot.content_hash = Some(content.insert(document));
    ledger.insert(LedgerRecord {
        id: LedgerId::new(70),
        product_name: snapshot.name.clone(),
        batch_number: snapshot.batch_number.clone(),
        manufacturer_id: snapshot.manufacturer_id,
        qr_hash: QR.into(),
        is_active: true,
        registered_at: Timestamp::new(1_730_000_500),
    });
    registry
        .insert_manufacturer(Manufacturer {
            id: ManufacturerId::new(6),
            name: "Saddle & Co".into(),
            is_active: true,
            is_verified: true,
        })
        .unwrap();
    registry.insert_product(snapshot).unwrap();

    let metrics = Arc::new(NodeMetrics::new());
    let orchestrator = VerificationOrchestrator::new(
        Collaborators {
            registry: registry.clone(),
            ledger: ledger.clone(),
            content,
        },
        Arc::new(NullClock::new(1_750_000_000)),
    );
    let service = VerificationService::new(orchestrator, ledger, registry, metrics.clone());

    ApiState {
        service: Arc::new(service),
        metrics: with_metrics.then_some(metrics),
        shutdown: ShutdownController::new(),
    }
}

fn app(with_metrics: bool) -> Router {
    router(state(with_metrics))
}

fn post_verification(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/verifications")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn genuine_scan_returns_authentic_verdict() {
    let response = app(true)
        .oneshot(post_verification(json!({
            "product_id": 21,
            "claimed_qr_hash": QR,
            "location": "Market Street store",
            "verifier_id": 8
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_authentic"], json!(true));
    assert_eq!(body["confidence"], json!(1.0));
    assert_eq!(body["ledger_anchored"], json!(true));
    assert!(body["record_id"].is_number());
    assert_eq!(body["evidence"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn missing_product_id_is_bad_request() {
    let response = app(true)
        .oneshot(post_verification(json!({ "claimed_qr_hash": QR })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("product id"));
}

#[tokio::test]
async fn unknown_product_is_not_found() {
    let response = app(true)
        .oneshot(post_verification(json!({
            "product_id": 999,
            "claimed_qr_hash": QR
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_lists_recorded_attempts() {
    let app = app(true);
    for qr in [QR, "00".repeat(32).as_str()] {
        let response = app
            .clone()
            .oneshot(post_verification(json!({ "product_id": 21, "claimed_qr_hash": qr })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(get("/v1/verifications/product/21"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let verifications = body["verifications"].as_array().unwrap();
    assert_eq!(verifications.len(), 2);
    assert_eq!(verifications[1]["record"]["verdict"]["is_authentic"], json!(false));
}

#[tokio::test]
async fn history_rejects_product_zero() {
    let response = app(true)
        .oneshot(get("/v1/verifications/product/0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app(false).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], json!("ok"));
}

#[tokio::test]
async fn metrics_endpoint_follows_configuration() {
    let enabled = app(true);
    enabled
        .clone()
        .oneshot(post_verification(json!({ "product_id": 21, "claimed_qr_hash": QR })))
        .await
        .unwrap();
    let response = enabled.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("veritag_verifications_total 1"));

    let disabled = app(false).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(disabled.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recorded_verification_can_be_fetched_by_id() {
    let app = app(true);
    let response = app
        .clone()
        .oneshot(post_verification(json!({ "product_id": 21, "claimed_qr_hash": QR })))
        .await
        .unwrap();
    let record_id = json_body(response).await["record_id"].as_u64().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/verifications/{record_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["id"], json!(record_id));
    assert_eq!(body["record"]["product_id"], json!(21));

    let missing = app.oneshot(get("/v1/verifications/9999")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn analysis_runs_checks_without_recording() {
    let app = app(true);
    app.clone()
        .oneshot(post_verification(json!({ "product_id": 21, "claimed_qr_hash": QR })))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/verifications/analyze/21")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["product_name"], json!("Leather Wallet"));
    assert_eq!(body["manufacturer"]["name"], json!("Saddle & Co"));
    assert_eq!(body["detection"]["is_authentic"], json!(true));
    assert!(body["detection"]["record_id"].is_null());
    assert_eq!(body["pattern"]["total"], json!(1));
    assert_eq!(body["pattern"]["frequency"], json!("normal"));
    assert_eq!(body["recent_history"].as_array().unwrap().len(), 1);

    let forged = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/verifications/analyze/21")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "claimed_qr_hash": "00".repeat(32) }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(forged).await["detection"]["is_authentic"], json!(false));

    let history = app
        .clone()
        .oneshot(get("/v1/verifications/product/21"))
        .await
        .unwrap();
    assert_eq!(
        json_body(history).await["verifications"]
            .as_array()
            .unwrap()
            .len(),
        1
    );

    let unknown = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/verifications/analyze/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn server_drains_on_shutdown() {
    let state = state(false);
    let shutdown = state.shutdown.clone();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = tokio::spawn(serve(listener, state));

    shutdown.shutdown();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
