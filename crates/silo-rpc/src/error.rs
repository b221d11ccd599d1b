use http::StatusCode;
use silo_domain::silo::SiloMode;
use silo_outbox::DeliveryError;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// The client was built in a silo mode that must never talk to this destination.
    #[error("{client} client is not allowed in {mode} mode")]
    DisallowedMode {
        client: &'static str,
        mode: SiloMode,
    },
    #[error("request attempts exceeded for {signature}")]
    AttemptsExceeded { signature: String },
    #[error("transport error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Upstream { url: String, status: StatusCode },
    #[error("{url} rejected the request with {status}")]
    Rejected { url: String, status: StatusCode },
    #[error("attempt cache error: {0:#}")]
    Cache(#[source] anyhow::Error),
    #[error("could not build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid silo address: {0}")]
    InvalidUrl(String),
    #[error("could not encode request body: {0}")]
    Body(#[from] serde_json::Error),
    #[error("request signing failed: {0}")]
    Signing(#[from] RpcAuthError),
}

impl RpcError {
    /// Worth retrying later: network failures and 5xx answers.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Upstream { .. } | Self::Cache(_))
    }
}

/// Attempt-cap refusals keep their own outcome; every other failure is
/// retried with backoff, 4xx answers included.
impl From<RpcError> for DeliveryError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::AttemptsExceeded { signature } => Self::AttemptsExceeded { signature },
            other => Self::Transient(other.into()),
        }
    }
}

/// Failures verifying or producing the `x-silo-rpc-signature` header.
#[derive(Debug, thiserror::Error)]
pub enum RpcAuthError {
    #[error("missing signature header")]
    Missing,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("signature expired")]
    Expired,
    #[error("malformed signature")]
    Malformed,
    #[error("signature was issued for another path")]
    PathMismatch,
    #[error("body digest does not match the signature")]
    DigestMismatch,
    #[error("could not encode signature: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}
