use axum::{extract::State, http::StatusCode};

use silo_outbox::OutboxEnvelope;
use silo_rpc::SignedRpc;

use crate::error::ControlServiceError;
use crate::state::AppState;
use crate::usecase::apply::ApplyRegionOutboxUseCase;

/// Receiver for region outbox envelopes. Signature and caller IP are checked
/// before this runs.
pub async fn receive_region_outbox(
    State(state): State<AppState>,
    rpc: SignedRpc,
) -> Result<StatusCode, ControlServiceError> {
    let envelope: OutboxEnvelope = serde_json::from_slice(&rpc.body)
        .map_err(|e| ControlServiceError::InvalidEnvelope(e.to_string()))?;
    tracing::debug!(
        caller = %rpc.claims.iss,
        category = envelope.category,
        object = envelope.object_identifier,
        "applying region outbox"
    );
    let usecase = ApplyRegionOutboxUseCase {
        mappings: state.mapping_repo(),
    };
    usecase.execute(&envelope).await?;
    Ok(StatusCode::OK)
}
