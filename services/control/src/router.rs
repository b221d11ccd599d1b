use axum::{
    Router, middleware,
    routing::{any, delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use silo_core::health::{healthz, readyz};
use silo_core::middleware::{propagate_request_id_layer, request_id_layer};
use silo_rpc::{OUTBOX_RECEIVER_PATH, require_region_ip};

use crate::handlers::{
    organizations::{provision_organization, proxy_to_region},
    outbox::receive_region_outbox,
    slugs::release_slug,
    users::update_user,
    webhooks::enqueue_webhook,
};
use crate::state::AppState;

/// Build the control router. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()`: the internal
/// receiver checks the caller's address.
pub fn build_router(state: AppState) -> Router {
    let internal = Router::new()
        .route(OUTBOX_RECEIVER_PATH, post(receive_region_outbox))
        .route_layer(middleware::from_fn_with_state(
            state.region_validator.clone(),
            require_region_ip,
        ));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/api/0/users/{user_id}", patch(update_user))
        // Organizations
        .route("/api/0/organizations", post(provision_organization))
        .route("/api/0/organizations/{slug}/{*rest}", any(proxy_to_region))
        // Slugs
        .route("/api/0/slug-reservations/{slug}", delete(release_slug))
        // Integrations
        .route(
            "/extensions/{provider}/webhook/{org_slug}",
            post(enqueue_webhook),
        )
        .merge(internal)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
