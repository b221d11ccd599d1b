//! Verbatim relay of end-user requests to the silo owning the data.

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use http::header::{self, HeaderName};
use http::{HeaderMap, HeaderValue};

use silo_core::error::AppError;

use crate::attempts::RequestAttemptCache;
use crate::client::SiloClient;
use crate::signing::SIGNATURE_HEADER;

/// Response header naming the backend URL that produced a proxied response.
pub const PROXY_URL_HEADER: &str = "x-silo-proxy-url";

/// Largest request body relayed to another silo.
pub const MAX_PROXY_BODY_BYTES: usize = 16 * 1024 * 1024;

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Copy of `headers` without hop-by-hop, `host`, `content-length` and the
/// internal signature header.
pub fn sanitize_headers(headers: &HeaderMap) -> HeaderMap {
    let mut sanitized = headers.clone();
    for name in HOP_BY_HOP {
        sanitized.remove(name);
    }
    sanitized.remove(header::HOST);
    sanitized.remove(header::CONTENT_LENGTH);
    sanitized.remove(SIGNATURE_HEADER);
    sanitized
}

/// Forward `request` to `client`'s silo and relay its answer.
///
/// Method, path, query, body and sanitized headers are forwarded. The
/// upstream status, sanitized headers and body are relayed unchanged, plus
/// [`PROXY_URL_HEADER`]. Unreachable upstreams answer 502.
pub async fn proxy_request<C: RequestAttemptCache>(
    client: &SiloClient<C>,
    request: Request,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| parts.uri.path().to_owned());
    let body = axum::body::to_bytes(body, MAX_PROXY_BODY_BYTES)
        .await
        .map_err(|_| AppError::BadRequest)?;

    let upstream = client
        .send(
            parts.method.clone(),
            &path_and_query,
            sanitize_headers(&parts.headers),
            body,
        )
        .await
        .map_err(|e| {
            tracing::warn!(
                destination = client.destination(),
                error = %e,
                "proxy request failed"
            );
            AppError::BadGateway
        })?;

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = sanitize_headers(&upstream.headers);
    let url = HeaderValue::from_str(&upstream.url).map_err(|e| AppError::Internal(e.into()))?;
    response
        .headers_mut()
        .insert(HeaderName::from_static(PROXY_URL_HEADER), url);
    Ok(response)
}
