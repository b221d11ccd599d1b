//! In-memory outbox table with the same claim semantics as the Postgres store.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

use silo_outbox::{
    ClaimOutcome, ClaimedShard, CoalescingKey, NewOutbox, OutboxError, OutboxRecord, OutboxStore,
};

#[derive(Default)]
pub struct MemoryOutboxStore {
    rows: Mutex<BTreeMap<i64, OutboxRecord>>,
    next_id: Mutex<i64>,
}

impl MemoryOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as a producer would, returning its id.
    pub fn push(&self, record: NewOutbox, now: DateTime<Utc>) -> i64 {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let id = *next_id;
        self.rows
            .lock()
            .unwrap()
            .insert(id, record.into_record(id, now));
        id
    }

    pub fn extend(&self, records: impl IntoIterator<Item = NewOutbox>, now: DateTime<Utc>) {
        for record in records {
            self.push(record, now);
        }
    }

    pub fn rows(&self) -> Vec<OutboxRecord> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutboxStore for MemoryOutboxStore {
    async fn due_shards(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<CoalescingKey>, OutboxError> {
        let rows = self.rows.lock().unwrap();
        // BTreeMap iterates by id, so first sight of a key is its MIN(id).
        let mut keys: Vec<CoalescingKey> = vec![];
        let mut blocked: Vec<CoalescingKey> = vec![];
        for row in rows.values() {
            let key = row.coalescing_key();
            if keys.contains(&key) || blocked.contains(&key) {
                continue;
            }
            let all_due = rows
                .values()
                .filter(|r| r.coalescing_key() == key)
                .all(|r| r.is_due(now));
            if all_due {
                keys.push(key);
            } else {
                blocked.push(key);
            }
        }
        keys.truncate(limit as usize);
        Ok(keys)
    }

    async fn claim(
        &self,
        key: &CoalescingKey,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
    ) -> Result<ClaimOutcome, OutboxError> {
        let mut rows = self.rows.lock().unwrap();
        let ids: Vec<i64> = rows
            .values()
            .filter(|r| &r.coalescing_key() == key)
            .map(|r| r.id)
            .collect();
        if ids.iter().any(|id| !rows[id].is_due(now)) {
            return Ok(ClaimOutcome::Busy);
        }
        let Some(&through_id) = ids.last() else {
            return Ok(ClaimOutcome::Empty);
        };
        let attempts = ids.iter().map(|id| rows[id].attempts).max().unwrap_or(0);
        for id in &ids {
            if let Some(row) = rows.get_mut(id) {
                row.scheduled_from = now;
                row.scheduled_for = lease_until;
            }
        }
        Ok(ClaimOutcome::Claimed(ClaimedShard {
            key: key.clone(),
            representative: rows[&through_id].clone(),
            through_id,
            attempts,
            row_count: ids.len() as u64,
            claimed_at: now,
        }))
    }

    async fn delete_claimed(&self, shard: &ClaimedShard) -> Result<u64, OutboxError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, r| !is_held_by(r, shard));
        Ok((before - rows.len()) as u64)
    }

    async fn reschedule(
        &self,
        shard: &ClaimedShard,
        next_at: DateTime<Utc>,
        attempt_duration: Duration,
    ) -> Result<u64, OutboxError> {
        let mut rows = self.rows.lock().unwrap();
        let mut updated = 0;
        for row in rows.values_mut().filter(|r| is_held_by(r, shard)) {
            row.attempts += 1;
            row.last_attempt_duration = Some(attempt_duration);
            row.scheduled_for = next_at;
            updated += 1;
        }
        Ok(updated)
    }
}

fn is_held_by(row: &OutboxRecord, shard: &ClaimedShard) -> bool {
    row.coalescing_key() == shard.key
        && row.id <= shard.through_id
        && row.scheduled_from == shard.claimed_at
}
