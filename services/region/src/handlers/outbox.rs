use axum::{extract::State, http::StatusCode};

use silo_outbox::OutboxEnvelope;
use silo_rpc::SignedRpc;

use crate::error::RegionServiceError;
use crate::state::AppState;
use crate::usecase::apply::ApplyControlOutboxUseCase;

/// Receiver for control outbox envelopes. The signature is checked by the
/// extractor before this runs.
pub async fn receive_control_outbox(
    State(state): State<AppState>,
    rpc: SignedRpc,
) -> Result<StatusCode, RegionServiceError> {
    let envelope: OutboxEnvelope = serde_json::from_slice(&rpc.body)
        .map_err(|e| RegionServiceError::InvalidEnvelope(e.to_string()))?;
    tracing::debug!(
        caller = %rpc.claims.iss,
        category = envelope.category,
        object = envelope.object_identifier,
        "applying control outbox"
    );
    let usecase = ApplyControlOutboxUseCase {
        organizations: state.organization_repo(),
        replicas: state.replica_repo(),
        region_name: state.region_name.clone(),
        drain: state.drain_signal.clone(),
    };
    usecase.execute(&envelope).await?;
    Ok(StatusCode::OK)
}
