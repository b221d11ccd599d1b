#![allow(async_fn_in_trait)]

use std::collections::HashMap;

use silo_domain::outbox::{OutboxCategory, OutboxDirection, OutboxScope};

use crate::error::OutboxError;
use crate::record::{CoalescingKey, NewOutbox};

/// Resolves the regions a Control→Region record must fan out to.
pub trait RegionResolver: Send + Sync {
    /// Regions holding data for `(scope, shard_identifier)`.
    ///
    /// Scopes without region semantics fail with
    /// [`OutboxError::UnresolvableScope`].
    async fn regions_for(
        &self,
        scope: OutboxScope,
        shard_identifier: i64,
    ) -> Result<Vec<String>, OutboxError>;
}

/// Implemented by entities whose mutations replicate to another silo.
///
/// Producers are called inside the mutating transaction and never perform
/// remote calls.
pub trait OutboxProducer {
    fn outbox_category(&self) -> OutboxCategory;

    fn shard_identifier(&self) -> i64;

    fn object_identifier(&self) -> i64;

    /// Current projection of the entity, or `None` once it has been deleted.
    fn outbox_payload(&self) -> Result<Option<serde_json::Value>, OutboxError>;

    /// Explicit destinations. `None` defers to the [`RegionResolver`].
    fn target_regions(&self) -> Option<Vec<String>> {
        None
    }

    /// The single Region→Control record for this mutation.
    fn region_outbox_for_update(&self) -> Result<NewOutbox, OutboxError> {
        NewOutbox::region(
            self.outbox_category(),
            self.shard_identifier(),
            self.object_identifier(),
            self.outbox_payload()?,
        )
    }

    /// One Control→Region record per destination region.
    async fn control_outboxes_for_update<R: RegionResolver>(
        &self,
        resolver: &R,
    ) -> Result<Vec<NewOutbox>, OutboxError> {
        let category = self.outbox_category();
        if category.direction() != OutboxDirection::ControlToRegion {
            return Err(OutboxError::MisconfiguredCategory {
                category,
                attempted: OutboxDirection::ControlToRegion,
            });
        }

        let mut regions = match self.target_regions() {
            Some(regions) => regions,
            None => {
                resolver
                    .regions_for(category.scope(), self.shard_identifier())
                    .await?
            }
        };
        regions.sort();
        regions.dedup();

        let payload = self.outbox_payload()?;
        regions
            .into_iter()
            .map(|region| {
                NewOutbox::control(
                    region,
                    category,
                    self.shard_identifier(),
                    self.object_identifier(),
                    payload.clone(),
                )
            })
            .collect()
    }
}

/// Records collected across several mutations before an explicit flush.
///
/// Records sharing a coalescing key collapse to the latest one, so a batch
/// that touches the same object repeatedly writes a single row.
#[derive(Debug, Default)]
pub struct OutboxBatch {
    records: Vec<NewOutbox>,
    index: HashMap<CoalescingKey, usize>,
    flush_now: bool,
}

impl OutboxBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an immediate drain once the batch has been committed.
    pub fn flush_now(mut self) -> Self {
        self.flush_now = true;
        self
    }

    pub fn wants_flush(&self) -> bool {
        self.flush_now
    }

    pub fn push(&mut self, record: NewOutbox) {
        let key = record.coalescing_key();
        match self.index.get(&key) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.index.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = NewOutbox>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn produce_region<P: OutboxProducer>(&mut self, producer: &P) -> Result<(), OutboxError> {
        self.push(producer.region_outbox_for_update()?);
        Ok(())
    }

    pub async fn produce_control<P: OutboxProducer, R: RegionResolver>(
        &mut self,
        producer: &P,
        resolver: &R,
    ) -> Result<(), OutboxError> {
        let records = producer.control_outboxes_for_update(resolver).await?;
        self.extend(records);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[NewOutbox] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NewOutbox> {
        self.records
    }
}
