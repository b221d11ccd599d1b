use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use silo_rpc::{RequestAttemptCache, RpcError};

/// Attempt counters kept in process. Clones share the same counters.
#[derive(Clone, Default)]
pub struct MemoryAttemptCache {
    counts: Arc<Mutex<HashMap<String, u64>>>,
}

impl MemoryAttemptCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, key: &str) -> u64 {
        self.counts.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.lock().unwrap().is_empty()
    }
}

impl RequestAttemptCache for MemoryAttemptCache {
    async fn increment(&self, key: &str, _ttl_secs: u64) -> Result<u64, RpcError> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(key.to_owned()).or_insert(0);
        *count += 1;
        Ok(*count)
    }

    async fn clear(&self, key: &str) -> Result<(), RpcError> {
        self.counts.lock().unwrap().remove(key);
        Ok(())
    }
}
