use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde_json::json;

use silo_control::router::build_router;
use silo_control::state::AppState;
use silo_core::health::Readiness;
use silo_domain::outbox::OutboxCategory;
use silo_domain::silo::SiloMode;
use silo_outbox::DrainSignal;
use silo_rpc::{RegionAddressValidator, RpcSecret};
use silo_testing::http::spawn_router_with_connect_info;
use silo_testing::rpc::signed_headers;

use crate::helpers::registry;

const SECRET: &str = "test-secret";

fn state(allowed: IpAddr) -> AppState {
    AppState {
        db: DatabaseConnection::Disconnected,
        regions: registry(),
        region_clients: Arc::new(BTreeMap::new()),
        region_validator: Arc::new(RegionAddressValidator::with_addresses([allowed])),
        rpc_secret: RpcSecret::new(SECRET),
        readiness: Readiness::default(),
        drain_signal: DrainSignal::new(),
    }
}

async fn serve(state: AppState) -> String {
    let addr = spawn_router_with_connect_info(build_router(state)).await;
    format!("http://{addr}")
}

async fn post_outbox(base: &str, body: Vec<u8>, signed: bool) -> reqwest::Response {
    let mut request = reqwest::Client::new().post(format!("{base}/internal/outbox"));
    if signed {
        request = request.headers(signed_headers(
            SECRET,
            SiloMode::Region,
            "/internal/outbox",
            &body,
        ));
    }
    request.body(body).send().await.unwrap()
}

#[tokio::test]
async fn should_report_liveness_and_readiness() {
    let state = state(IpAddr::V4(Ipv4Addr::LOCALHOST));
    let readiness = state.readiness.clone();
    let base = serve(state).await;

    let health = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(health.status(), 200);
    let ready = reqwest::get(format!("{base}/readyz")).await.unwrap();
    assert_eq!(ready.status(), 503);

    readiness.mark_ready();
    let ready = reqwest::get(format!("{base}/readyz")).await.unwrap();
    assert_eq!(ready.status(), 200);
    assert!(ready.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_forbid_outbox_calls_from_non_region_addresses() {
    let base = serve(state(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))).await;

    let response = post_outbox(&base, b"{}".to_vec(), true).await;

    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_reject_unsigned_outbox_calls() {
    let base = serve(state(IpAddr::V4(Ipv4Addr::LOCALHOST))).await;

    let response = post_outbox(&base, b"{}".to_vec(), false).await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn should_reject_malformed_envelope() {
    let base = serve(state(IpAddr::V4(Ipv4Addr::LOCALHOST))).await;

    let response = post_outbox(&base, b"not json".to_vec(), true).await;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "INVALID_ENVELOPE");
}

#[tokio::test]
async fn should_reject_misdirected_category() {
    let base = serve(state(IpAddr::V4(Ipv4Addr::LOCALHOST))).await;
    let envelope = json!({
        "category": OutboxCategory::UserUpdate.as_i32(),
        "scope": OutboxCategory::UserUpdate.scope().as_i32(),
        "shard_identifier": 1,
        "object_identifier": 1,
        "payload": null,
    });

    let response = post_outbox(&base, serde_json::to_vec(&envelope).unwrap(), true).await;

    assert_eq!(response.status(), 400);
}
