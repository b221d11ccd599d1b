#![allow(async_fn_in_trait)]

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::StreamExt as _;
use futures::stream;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use crate::backoff::BackoffPolicy;
use crate::error::OutboxError;
use crate::record::{CoalescingKey, OutboxRecord};
use crate::store::{ClaimOutcome, OutboxStore};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Network failure, 5xx, or any other error worth retrying.
    #[error("transient delivery failure: {0:#}")]
    Transient(#[from] anyhow::Error),

    /// The attempt cap for this request was reached; no call was made.
    #[error("attempts exceeded for {signature}")]
    AttemptsExceeded { signature: String },
}

/// Sends the representative record of a claimed key to the counterpart silo.
pub trait OutboxDelivery: Send + Sync {
    async fn deliver(&self, record: &OutboxRecord) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrainConfig {
    /// Maximum keys listed per pass.
    pub batch_size: u64,
    /// Keys delivered in parallel within a pass.
    pub concurrency: usize,
    /// How long a claim is held before another drainer may take the key.
    pub lease: Duration,
    /// Upper bound on one delivery. Capped at half the lease so an abandoned
    /// delivery never lands after another drainer has taken the key over.
    pub delivery_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            concurrency: 8,
            lease: Duration::from_secs(60),
            delivery_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl DrainConfig {
    pub fn delivery_deadline(&self) -> Duration {
        self.delivery_timeout.min(self.lease / 2)
    }

    /// Reject settings the drain loop cannot run with.
    pub fn validated(self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !self.poll_interval.is_zero(),
            "drain interval must be at least one second"
        );
        anyhow::ensure!(self.batch_size > 0, "drain batch size must be positive");
        anyhow::ensure!(
            !self.delivery_deadline().is_zero(),
            "delivery timeout and lease must be positive"
        );
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Due keys listed at the start of the pass.
    pub listed: u64,
    /// Keys delivered and retired.
    pub delivered: u64,
    /// Rows retired without their own delivery because a newer row of the
    /// same key was delivered instead.
    pub coalesced: u64,
    pub failed: u64,
    /// Keys whose delivery hit the request attempt cap.
    pub capped: u64,
    /// Keys claimed by someone else between listing and claiming.
    pub busy: u64,
}

impl DrainReport {
    pub fn is_idle(&self) -> bool {
        self.listed == 0
    }

    fn record(&mut self, outcome: ShardOutcome) {
        match outcome {
            ShardOutcome::Delivered { rows } => {
                self.delivered += 1;
                self.coalesced += rows.saturating_sub(1);
            }
            ShardOutcome::Failed => self.failed += 1,
            ShardOutcome::Capped => self.capped += 1,
            ShardOutcome::Busy => self.busy += 1,
            ShardOutcome::Empty => {}
        }
    }
}

/// Result of draining one coalescing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardOutcome {
    Delivered { rows: u64 },
    Failed,
    Capped,
    Busy,
    Empty,
}

/// Wakes a running drainer ahead of its next tick.
#[derive(Debug, Clone, Default)]
pub struct DrainSignal(Arc<Notify>);

impl DrainSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a pass. Coalesces with other pending requests.
    pub fn notify(&self) {
        self.0.notify_one();
    }

    pub async fn notified(&self) {
        self.0.notified().await;
    }
}

pub struct OutboxDrainer<S, D> {
    store: S,
    delivery: D,
    policy: BackoffPolicy,
    config: DrainConfig,
}

impl<S, D> OutboxDrainer<S, D>
where
    S: OutboxStore,
    D: OutboxDelivery,
{
    pub fn new(store: S, delivery: D) -> Self {
        Self {
            store,
            delivery,
            policy: BackoffPolicy::default(),
            config: DrainConfig::default(),
        }
    }

    pub fn with_policy(mut self, policy: BackoffPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_config(mut self, config: DrainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn delivery(&self) -> &D {
        &self.delivery
    }

    pub async fn drain_once(&self) -> Result<DrainReport, OutboxError> {
        self.drain_at(Utc::now()).await
    }

    /// One pass over the keys due at `now`.
    ///
    /// Store errors on individual keys are logged and counted as failures so
    /// one bad key does not stall the rest of the pass.
    pub async fn drain_at(&self, now: DateTime<Utc>) -> Result<DrainReport, OutboxError> {
        let keys = self.store.due_shards(now, self.config.batch_size).await?;
        let mut report = DrainReport {
            listed: keys.len() as u64,
            ..DrainReport::default()
        };

        let outcomes: Vec<_> = stream::iter(keys)
            .map(|key| async move {
                let result = self.drain_shard(&key, now).await;
                (key, result)
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        for (key, result) in outcomes {
            match result {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "outbox shard drain failed");
                    report.failed += 1;
                }
            }
        }

        if !report.is_idle() {
            tracing::info!(
                listed = report.listed,
                delivered = report.delivered,
                coalesced = report.coalesced,
                failed = report.failed,
                capped = report.capped,
                busy = report.busy,
                "outbox drain pass finished"
            );
        }
        Ok(report)
    }

    /// Claim, deliver and settle one key.
    pub async fn drain_shard(
        &self,
        key: &CoalescingKey,
        now: DateTime<Utc>,
    ) -> Result<ShardOutcome, OutboxError> {
        let lease_until = now + chrono_duration(self.config.lease);
        let shard = match self.store.claim(key, now, lease_until).await? {
            ClaimOutcome::Claimed(shard) => shard,
            ClaimOutcome::Busy => return Ok(ShardOutcome::Busy),
            ClaimOutcome::Empty => return Ok(ShardOutcome::Empty),
        };

        let deadline = self.config.delivery_deadline();
        let started = Instant::now();
        let result =
            match tokio::time::timeout(deadline, self.delivery.deliver(&shard.representative))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Transient(anyhow::anyhow!(
                    "delivery exceeded {deadline:?}"
                ))),
            };
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                let rows = self.store.delete_claimed(&shard).await?;
                if rows == 0 {
                    tracing::warn!(key = %key, "outbox claim lost before delivery was settled");
                } else {
                    tracing::debug!(key = %key, rows, "outbox shard delivered");
                }
                Ok(ShardOutcome::Delivered { rows })
            }
            Err(err) => {
                let attempts = shard.attempts.saturating_add(1);
                let next_at =
                    now + chrono_duration(elapsed) + chrono_duration(self.policy.delay(attempts));
                let outcome = match &err {
                    DeliveryError::AttemptsExceeded { signature } => {
                        tracing::error!(
                            kind = "ATTEMPTS_EXCEEDED",
                            key = %key,
                            signature = %signature,
                            attempts,
                            "outbox delivery hit the request attempt cap"
                        );
                        ShardOutcome::Capped
                    }
                    DeliveryError::Transient(e) => {
                        tracing::warn!(
                            key = %key,
                            attempts,
                            error = %e,
                            next_at = %next_at,
                            "outbox delivery failed"
                        );
                        ShardOutcome::Failed
                    }
                };
                let rows = self.store.reschedule(&shard, next_at, elapsed).await?;
                if rows == 0 {
                    tracing::warn!(key = %key, "outbox claim lost before failure was recorded");
                }
                Ok(outcome)
            }
        }
    }

    /// Drain on every tick or signal until `shutdown` resolves.
    ///
    /// A pass that listed a full batch is followed immediately by another one.
    pub async fn run<F>(&self, signal: DrainSignal, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("outbox drainer stopping");
                    return;
                }
                _ = interval.tick() => {}
                _ = signal.notified() => {}
            }

            loop {
                match self.drain_once().await {
                    Ok(report) => {
                        let progressed = report.busy < report.listed;
                        if report.listed < self.config.batch_size || !progressed {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "outbox drain pass failed");
                        break;
                    }
                }
            }
        }
    }
}

fn chrono_duration(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
