use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use silo_core::health::{healthz, readyz};
use silo_core::middleware::{propagate_request_id_layer, request_id_layer};
use silo_rpc::OUTBOX_RECEIVER_PATH;

use crate::handlers::{
    organizations::{get_organization, remove_member, update_organization, upsert_member},
    outbox::receive_control_outbox,
    slugs::get_slug_reservation,
    webhooks::receive_webhook,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Organizations
        .route(
            "/api/0/organizations/{slug}",
            get(get_organization).patch(update_organization),
        )
        .route(
            "/api/0/organizations/{slug}/members/{user_id}",
            put(upsert_member).delete(remove_member),
        )
        // Slugs
        .route("/api/0/slug-reservations/{slug}", get(get_slug_reservation))
        // Integrations
        .route("/extensions/{provider}/webhook/{*rest}", post(receive_webhook))
        // Internal
        .route(OUTBOX_RECEIVER_PATH, post(receive_control_outbox))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
