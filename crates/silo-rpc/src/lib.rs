//! Cross-silo HTTP plumbing.
//!
//! [`client::SiloClient`] sends signed requests to the counterpart silo and
//! enforces the per-request attempt cap. The receiving side verifies them
//! with [`extractor::SignedRpc`] and, for region traffic into control,
//! [`allowlist::require_region_ip`]. [`proxy::proxy_request`] relays end-user
//! requests verbatim to the silo that owns the data.

pub mod allowlist;
pub mod attempts;
pub mod client;
pub mod error;
pub mod extractor;
pub mod proxy;
pub mod signing;

pub use allowlist::{RegionAddressValidator, require_region_ip};
pub use attempts::{RedisAttemptCache, RequestAttemptCache};
pub use client::{OUTBOX_RECEIVER_PATH, RpcResponse, SiloClient};
pub use error::{RpcAuthError, RpcError};
pub use extractor::{RpcSecret, SignedRpc};
pub use proxy::proxy_request;
