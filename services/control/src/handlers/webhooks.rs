use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
};
use bytes::Bytes;

use silo_domain::payload::{WebhookHeader, WebhookPayload};
use silo_rpc::proxy::sanitize_headers;

use crate::error::ControlServiceError;
use crate::state::AppState;
use crate::usecase::webhook::{EnqueueWebhookInput, EnqueueWebhookUseCase};

/// Accept a third-party webhook and queue it for the organization's region.
pub async fn enqueue_webhook(
    State(state): State<AppState>,
    Path((provider, org_slug)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ControlServiceError> {
    let headers = sanitize_headers(&headers)
        .iter()
        .map(|(name, value)| WebhookHeader::new(name.as_str(), value.as_bytes()))
        .collect();
    let path = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned());
    let request = WebhookPayload {
        method: method.as_str().to_owned(),
        path,
        headers,
        body: body.to_vec(),
    };

    let usecase = EnqueueWebhookUseCase {
        mappings: state.mapping_repo(),
        outboxes: state.outbox_writer(),
        resolver: state.region_resolver(),
        drain: state.drain_signal.clone(),
    };
    let id = usecase
        .execute(EnqueueWebhookInput {
            organization_slug: org_slug,
            request,
        })
        .await?;
    tracing::info!(provider = %provider, webhook_id = id, "webhook queued for region");
    Ok(StatusCode::ACCEPTED)
}
