use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use sea_orm::DatabaseConnection;
use serde_json::json;

use silo_core::health::Readiness;
use silo_domain::outbox::OutboxCategory;
use silo_domain::silo::SiloMode;
use silo_outbox::DrainSignal;
use silo_region::router::build_router;
use silo_region::state::AppState;
use silo_rpc::RpcSecret;
use silo_testing::rpc::signed_headers;

use crate::helpers::REGION;

const SECRET: &str = "test-secret";

fn state() -> AppState {
    AppState {
        db: DatabaseConnection::Disconnected,
        region_name: REGION.to_owned(),
        rpc_secret: RpcSecret::new(SECRET),
        readiness: Readiness::default(),
        drain_signal: DrainSignal::new(),
    }
}

async fn post_signed(server: &TestServer, path: &str, body: Vec<u8>) -> TestResponse {
    let mut request = server.post(path);
    for (name, value) in signed_headers(SECRET, SiloMode::Control, path, &body).iter() {
        request = request.add_header(name.clone(), value.clone());
    }
    request.bytes(body.into()).await
}

#[tokio::test]
async fn should_report_liveness_and_readiness() {
    let state = state();
    let readiness = state.readiness.clone();
    let server = TestServer::new(build_router(state)).unwrap();

    server.get("/healthz").await.assert_status_ok();
    server
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);

    readiness.mark_ready();
    let ready = server.get("/readyz").await;
    ready.assert_status_ok();
    assert!(ready.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_reject_unsigned_outbox_calls() {
    let server = TestServer::new(build_router(state())).unwrap();

    let response = server.post("/internal/outbox").json(&json!({})).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_envelope_for_another_region() {
    let server = TestServer::new(build_router(state())).unwrap();
    let envelope = json!({
        "category": OutboxCategory::UserUpdate.as_i32(),
        "scope": OutboxCategory::UserUpdate.scope().as_i32(),
        "shard_identifier": 1001,
        "object_identifier": 1001,
        "region_name": "de",
        "payload": null,
    });

    let response = post_signed(
        &server,
        "/internal/outbox",
        serde_json::to_vec(&envelope).unwrap(),
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "INVALID_ENVELOPE");
}

#[tokio::test]
async fn should_reject_unknown_category_code() {
    let server = TestServer::new(build_router(state())).unwrap();
    let envelope = json!({
        "category": 99,
        "scope": 0,
        "shard_identifier": 1,
        "object_identifier": 1,
    });

    let response = post_signed(
        &server,
        "/internal/outbox",
        serde_json::to_vec(&envelope).unwrap(),
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_accept_signed_webhook_replay() {
    let server = TestServer::new(build_router(state())).unwrap();

    let response = post_signed(
        &server,
        "/extensions/github/webhook/acme",
        br#"{"ref":"main"}"#.to_vec(),
    )
    .await;

    response.assert_status(StatusCode::ACCEPTED);
}

#[tokio::test]
async fn should_reject_unsigned_webhook() {
    let server = TestServer::new(build_router(state())).unwrap();

    let response = server
        .post("/extensions/github/webhook/acme")
        .text(r#"{"ref":"main"}"#)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}
