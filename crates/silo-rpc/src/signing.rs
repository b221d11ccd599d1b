//! Shared-secret request signatures between silos.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use silo_domain::silo::SiloMode;

use crate::error::RpcAuthError;

/// Header carrying the HS256 signature of a cross-silo request.
pub const SIGNATURE_HEADER: &str = "x-silo-rpc-signature";

/// Signatures are valid for one minute after issue.
pub const SIGNATURE_TTL_SECS: i64 = 60;

/// Claims of a request signature.
///
/// | Field | Meaning |
/// |-------|---------|
/// | `iss` | mode of the calling silo |
/// | `sub` | request path, without query |
/// | `digest` | SHA-256 hex of the request body |
/// | `iat` / `exp` | issue and expiry, seconds since epoch |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcClaims {
    pub iss: String,
    pub sub: String,
    pub digest: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn body_digest(body: &[u8]) -> String {
    format!("{:x}", Sha256::digest(body))
}

pub fn sign_request(
    secret: &str,
    mode: SiloMode,
    path: &str,
    body: &[u8],
) -> Result<String, RpcAuthError> {
    let iat = chrono::Utc::now().timestamp();
    let claims = RpcClaims {
        iss: mode.as_str().to_owned(),
        sub: path.to_owned(),
        digest: body_digest(body),
        iat,
        exp: iat + SIGNATURE_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(RpcAuthError::Encode)
}

/// Check signature, expiry, path and body digest.
pub fn verify_request(
    secret: &str,
    token: &str,
    path: &str,
    body: &[u8],
) -> Result<RpcClaims, RpcAuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 5;
    validation.set_required_spec_claims(&["exp", "sub", "iss"]);

    let data = decode::<RpcClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => RpcAuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => RpcAuthError::InvalidSignature,
        _ => RpcAuthError::Malformed,
    })?;

    let claims = data.claims;
    if claims.sub != path {
        return Err(RpcAuthError::PathMismatch);
    }
    if claims.digest != body_digest(body) {
        return Err(RpcAuthError::DigestMismatch);
    }
    Ok(claims)
}
