//! Transactional outbox for cross-silo replication.
//!
//! Producers write [`record::NewOutbox`] rows inside the same database
//! transaction as the mutation that caused them. A [`drain::OutboxDrainer`]
//! later claims due coalescing keys, delivers the newest payload of each key
//! through an [`drain::OutboxDelivery`], and deletes every row the delivery
//! covered. Delivery is at-least-once; receivers must be idempotent.

pub mod backoff;
pub mod drain;
pub mod error;
pub mod producer;
pub mod record;
pub mod sea_store;
pub mod store;

pub use backoff::BackoffPolicy;
pub use drain::{
    DeliveryError, DrainConfig, DrainReport, DrainSignal, OutboxDelivery, OutboxDrainer, ShardOutcome,
};
pub use error::OutboxError;
pub use producer::{OutboxBatch, OutboxProducer, RegionResolver};
pub use record::{CoalescingKey, NewOutbox, OutboxEnvelope, OutboxRecord, encode_payload};
pub use sea_store::{OutboxTable, SeaOutboxStore, write_outboxes};
pub use store::{ClaimOutcome, ClaimedShard, OutboxStore};
