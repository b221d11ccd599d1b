#![allow(async_fn_in_trait)]

//! Per-request attempt counters shared by every drainer of a silo.

use deadpool_redis::Pool;
use deadpool_redis::redis::{self, AsyncCommands};
use http::Method;
use sha2::{Digest, Sha256};

use crate::error::RpcError;

/// Counter window, starting at the first attempt.
pub const ATTEMPTS_TTL_SECS: u64 = 600;

/// Attempts allowed per window before a request is refused locally.
pub const DEFAULT_ATTEMPT_LIMIT: u64 = 10;

/// Counter key for one logical request.
///
/// `prefix` identifies the effect being delivered (the outbox coalescing key),
/// so distinct effects sent to the same endpoint count separately.
pub fn attempt_key(prefix: &str, destination: &str, method: &Method, path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(destination.as_bytes());
    hasher.update(method.as_str().as_bytes());
    hasher.update(path.as_bytes());
    format!("request_attempts:{:x}", hasher.finalize())
}

pub trait RequestAttemptCache: Send + Sync {
    /// Count one more attempt and return the new total within the window.
    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u64, RpcError>;

    /// Forget every attempt recorded under `key`.
    async fn clear(&self, key: &str) -> Result<(), RpcError>;
}

#[derive(Clone)]
pub struct RedisAttemptCache {
    pub pool: Pool,
}

impl RequestAttemptCache for RedisAttemptCache {
    async fn increment(&self, key: &str, ttl_secs: u64) -> Result<u64, RpcError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| RpcError::Cache(e.into()))?;
        // SET NX EX opens the window without extending it on later attempts.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .ignore()
            .cmd("INCR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e: redis::RedisError| RpcError::Cache(e.into()))?;
        Ok(count)
    }

    async fn clear(&self, key: &str) -> Result<(), RpcError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| RpcError::Cache(e.into()))?;
        let (): () = conn
            .del(key)
            .await
            .map_err(|e: redis::RedisError| RpcError::Cache(e.into()))?;
        Ok(())
    }
}
