//! Extractor for signed cross-silo requests.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequest, Request};
use bytes::Bytes;
use serde::de::DeserializeOwned;

use silo_core::error::AppError;

use crate::signing::{RpcClaims, SIGNATURE_HEADER, verify_request};

/// Largest body accepted on an internal RPC endpoint.
pub const MAX_RPC_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Shared secret used to verify request signatures. Exposed to the extractor
/// through `FromRef` on the service state.
#[derive(Clone)]
pub struct RpcSecret(Arc<str>);

impl RpcSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A request body whose signature, path and digest have been verified.
///
/// Rejects with 401 when the signature header is absent or invalid.
#[derive(Debug, Clone)]
pub struct SignedRpc {
    pub claims: RpcClaims,
    pub body: Bytes,
}

impl SignedRpc {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::warn!(error = %e, "malformed cross-silo request body");
            AppError::BadRequest
        })
    }
}

impl<S> FromRequest<S> for SignedRpc
where
    S: Send + Sync,
    RpcSecret: FromRef<S>,
{
    type Rejection = AppError;

    // Resolve the secret from state synchronously so the returned future does
    // not borrow `state`.
    fn from_request(
        req: Request,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = RpcSecret::from_ref(state);

        async move {
            let (parts, body) = req.into_parts();
            let token = parts
                .headers
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
                .ok_or(AppError::Unauthorized)?;
            let path = parts.uri.path();

            let body = axum::body::to_bytes(body, MAX_RPC_BODY_BYTES)
                .await
                .map_err(|_| AppError::BadRequest)?;

            let claims = verify_request(secret.as_str(), &token, path, &body).map_err(|e| {
                tracing::warn!(error = %e, path, "rejected cross-silo request");
                AppError::Unauthorized
            })?;
            Ok(Self { claims, body })
        }
    }
}
