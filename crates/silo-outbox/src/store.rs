#![allow(async_fn_in_trait)]

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::OutboxError;
use crate::record::{CoalescingKey, OutboxRecord};

/// A coalescing key leased to one drainer.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimedShard {
    pub key: CoalescingKey,
    /// Newest row of the key; its payload is the one delivered.
    pub representative: OutboxRecord,
    /// Highest row id covered by this claim. Rows written after the claim
    /// have larger ids and survive the delivery.
    pub through_id: i64,
    /// Highest attempt count among the claimed rows.
    pub attempts: i32,
    /// Number of rows collapsed into this delivery.
    pub row_count: u64,
    /// `scheduled_from` stamped on the claimed rows. Settling only touches
    /// rows still carrying it, so a drainer whose lease ran out cannot undo
    /// the work of the drainer that took the key over.
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    Claimed(ClaimedShard),
    /// Another drainer holds the lease, or the key is backing off.
    Busy,
    /// Every row was delivered since the key was listed as due.
    Empty,
}

/// Persistence port for one outbox table.
pub trait OutboxStore: Send + Sync {
    /// Keys whose rows are all due at `now`, oldest first.
    async fn due_shards(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<CoalescingKey>, OutboxError>;

    /// Lease every current row of `key` until `lease_until`.
    async fn claim(
        &self,
        key: &CoalescingKey,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<ClaimOutcome, OutboxError>;

    /// Delete the rows of `shard` that are still held by its claim. Returns
    /// the number removed; zero means the claim was lost.
    async fn delete_claimed(&self, shard: &ClaimedShard) -> Result<u64, OutboxError>;

    /// Record a failed attempt and move the rows still held by `shard` into
    /// backoff. Returns the number of rows updated.
    async fn reschedule(
        &self,
        shard: &ClaimedShard,
        next_at: DateTime<Utc>,
        attempt_duration: Duration,
    ) -> Result<u64, OutboxError>;
}
