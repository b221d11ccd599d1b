use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use silo_domain::outbox::{OutboxCategory, OutboxDirection, OutboxScope};

use crate::error::OutboxError;

/// Identity of one logical pending effect.
///
/// All records sharing a key are interchangeable except for their payload:
/// only the newest payload is delivered, and a successful delivery retires
/// every record of the key that existed when it was claimed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoalescingKey {
    /// Destination region; `None` for Region→Control records.
    pub region_name: Option<String>,
    pub scope: OutboxScope,
    pub shard_identifier: i64,
    pub category: OutboxCategory,
    pub object_identifier: i64,
}

impl CoalescingKey {
    pub fn destination(&self) -> &str {
        self.region_name.as_deref().unwrap_or("control")
    }
}

impl fmt::Display for CoalescingKey {
    /// Stable textual form, also used as the attempt-cap prefix.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}/{}:{}",
            self.destination(),
            self.scope,
            self.shard_identifier,
            self.category,
            self.object_identifier
        )
    }
}

/// A record about to be written by a producer.
///
/// Only constructible through [`NewOutbox::region`] and [`NewOutbox::control`],
/// which reject categories flowing the other way.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOutbox {
    region_name: Option<String>,
    category: OutboxCategory,
    shard_identifier: i64,
    object_identifier: i64,
    payload: Option<serde_json::Value>,
}

impl NewOutbox {
    /// Build a Region→Control record.
    pub fn region(
        category: OutboxCategory,
        shard_identifier: i64,
        object_identifier: i64,
        payload: Option<serde_json::Value>,
    ) -> Result<Self, OutboxError> {
        ensure_direction(category, OutboxDirection::RegionToControl)?;
        Ok(Self {
            region_name: None,
            category,
            shard_identifier,
            object_identifier,
            payload,
        })
    }

    /// Build a Control→Region record bound for `region_name`.
    pub fn control(
        region_name: impl Into<String>,
        category: OutboxCategory,
        shard_identifier: i64,
        object_identifier: i64,
        payload: Option<serde_json::Value>,
    ) -> Result<Self, OutboxError> {
        ensure_direction(category, OutboxDirection::ControlToRegion)?;
        let region_name = region_name.into();
        if region_name.trim().is_empty() {
            return Err(OutboxError::MissingRegion(category));
        }
        Ok(Self {
            region_name: Some(region_name),
            category,
            shard_identifier,
            object_identifier,
            payload,
        })
    }

    pub fn region_name(&self) -> Option<&str> {
        self.region_name.as_deref()
    }

    pub fn category(&self) -> OutboxCategory {
        self.category
    }

    pub fn scope(&self) -> OutboxScope {
        self.category.scope()
    }

    pub fn shard_identifier(&self) -> i64 {
        self.shard_identifier
    }

    pub fn object_identifier(&self) -> i64 {
        self.object_identifier
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    pub fn direction(&self) -> OutboxDirection {
        self.category.direction()
    }

    pub fn coalescing_key(&self) -> CoalescingKey {
        CoalescingKey {
            region_name: self.region_name.clone(),
            scope: self.scope(),
            shard_identifier: self.shard_identifier,
            category: self.category,
            object_identifier: self.object_identifier,
        }
    }

    /// Materialize as a stored row, due immediately.
    pub fn into_record(self, id: i64, now: DateTime<Utc>) -> OutboxRecord {
        OutboxRecord {
            id,
            region_name: self.region_name,
            scope: self.category.scope(),
            shard_identifier: self.shard_identifier,
            category: self.category,
            object_identifier: self.object_identifier,
            payload: self.payload,
            attempts: 0,
            last_attempt_duration: None,
            scheduled_from: now,
            scheduled_for: now,
            date_added: now,
        }
    }
}

fn ensure_direction(
    category: OutboxCategory,
    attempted: OutboxDirection,
) -> Result<(), OutboxError> {
    if category.direction() == attempted {
        Ok(())
    } else {
        Err(OutboxError::MisconfiguredCategory {
            category,
            attempted,
        })
    }
}

/// A stored outbox row.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxRecord {
    pub id: i64,
    pub region_name: Option<String>,
    pub scope: OutboxScope,
    pub shard_identifier: i64,
    pub category: OutboxCategory,
    pub object_identifier: i64,
    pub payload: Option<serde_json::Value>,
    pub attempts: i32,
    /// Wall time of the most recent failed delivery attempt.
    pub last_attempt_duration: Option<Duration>,
    /// Start of the current claim or backoff window.
    pub scheduled_from: DateTime<Utc>,
    /// Earliest time the row may be claimed again.
    pub scheduled_for: DateTime<Utc>,
    pub date_added: DateTime<Utc>,
}

impl OutboxRecord {
    pub fn coalescing_key(&self) -> CoalescingKey {
        CoalescingKey {
            region_name: self.region_name.clone(),
            scope: self.scope,
            shard_identifier: self.shard_identifier,
            category: self.category,
            object_identifier: self.object_identifier,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_for <= now
    }

    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<Option<T>, OutboxError> {
        decode_payload(self.category, self.payload.as_ref())
    }

    pub fn envelope(&self) -> OutboxEnvelope {
        OutboxEnvelope {
            category: self.category.as_i32(),
            scope: self.scope.as_i32(),
            shard_identifier: self.shard_identifier,
            object_identifier: self.object_identifier,
            region_name: self.region_name.clone(),
            payload: self.payload.clone(),
        }
    }
}

/// Wire body of `POST /internal/outbox`. Integer codes are the frozen contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEnvelope {
    pub category: i32,
    pub scope: i32,
    pub shard_identifier: i64,
    pub object_identifier: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl OutboxEnvelope {
    /// Decode and cross-check the category and scope codes.
    pub fn category(&self) -> Result<OutboxCategory, OutboxError> {
        let category = OutboxCategory::from_i32(self.category)
            .ok_or(OutboxError::UnknownCategory(self.category))?;
        let scope =
            OutboxScope::from_i32(self.scope).ok_or(OutboxError::UnknownScope(self.scope))?;
        if category.scope() != scope {
            return Err(OutboxError::ScopeMismatch { category, scope });
        }
        Ok(category)
    }

    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<Option<T>, OutboxError> {
        decode_payload(self.category()?, self.payload.as_ref())
    }
}

fn decode_payload<T: DeserializeOwned>(
    category: OutboxCategory,
    payload: Option<&serde_json::Value>,
) -> Result<Option<T>, OutboxError> {
    match payload {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|source| OutboxError::Payload { category, source }),
    }
}

/// Serialize a payload for `category`, mapping failures to [`OutboxError::Payload`].
pub fn encode_payload<T: Serialize>(
    category: OutboxCategory,
    value: &T,
) -> Result<serde_json::Value, OutboxError> {
    serde_json::to_value(value).map_err(|source| OutboxError::Payload { category, source })
}
