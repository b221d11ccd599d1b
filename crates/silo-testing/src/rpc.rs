//! Signed-request helpers for exercising internal endpoints in tests.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use silo_domain::silo::SiloMode;
use silo_rpc::signing::{SIGNATURE_HEADER, sign_request};

/// Headers a counterpart silo in `mode` would send for `path` and `body`.
pub fn signed_headers(secret: &str, mode: SiloMode, path: &str, body: &[u8]) -> HeaderMap {
    let signature = sign_request(secret, mode, path, body).unwrap();
    let mut map = HeaderMap::new();
    map.insert(
        HeaderName::from_static(SIGNATURE_HEADER),
        HeaderValue::from_str(&signature).unwrap(),
    );
    map.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    map
}
