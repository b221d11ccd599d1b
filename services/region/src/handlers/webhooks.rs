use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
};

use silo_rpc::SignedRpc;

use crate::state::AppState;

/// Accept a webhook control captured and replayed against this region.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path((provider, rest)): Path<(String, String)>,
    method: Method,
    rpc: SignedRpc,
) -> StatusCode {
    tracing::info!(
        region = %state.region_name,
        provider = %provider,
        target = %rest,
        %method,
        bytes = rpc.body.len(),
        "webhook received"
    );
    StatusCode::ACCEPTED
}
