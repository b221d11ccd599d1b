//! Category-specific outbox payloads.
//!
//! Payloads carry the full current state of the object so that delivering only
//! the latest record of a coalescing key is enough for the receiver to converge.
//! A `null` payload means the object no longer exists at the origin.

use serde::{Deserialize, Serialize};

use crate::id::{OrganizationId, SlugReservationId, UserId};

/// `UserUpdate`: current user fields replicated into every region the user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdatePayload {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
}

/// Kind of slug reservation.
///
/// Wire format in the database: `i16` (0 = Primary, 1 = TemporaryRenaming).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugReservationType {
    Primary = 0,
    TemporaryRenaming = 1,
}

impl SlugReservationType {
    /// Convert from `i16` wire value. Returns `None` for unknown values.
    pub fn from_i16(v: i16) -> Option<Self> {
        match v {
            0 => Some(Self::Primary),
            1 => Some(Self::TemporaryRenaming),
            _ => None,
        }
    }

    pub fn as_i16(self) -> i16 {
        self as i16
    }
}

/// `OrganizationSlugReservationUpdate`: the reservation as it exists in Control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugReservationPayload {
    pub reservation_id: SlugReservationId,
    pub slug: String,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub region_name: String,
    pub reservation_type: SlugReservationType,
}

/// `ProvisionOrganization`: ask a region to create an organization Control has reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionOrganizationPayload {
    pub organization_id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub owner_user_id: UserId,
}

/// `PostOrganizationProvision`: region confirms the organization exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProvisionPayload {
    pub organization_id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub owner_user_id: UserId,
    pub region_name: String,
}

/// `OrganizationUpdate`: region-owned organization fields Control mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationUpdatePayload {
    pub organization_id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub region_name: String,
}

/// `OrganizationMemberUpdate`: one membership row. `null` payload = membership removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMemberPayload {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: String,
}

/// `WebhookProxy`: an inbound third-party webhook captured verbatim for replay
/// against the owning region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub method: String,
    /// Path and query as received, e.g. `/extensions/github/webhook/acme?x=1`.
    pub path: String,
    pub headers: Vec<WebhookHeader>,
    /// Body bytes as received; provider signatures are computed over them.
    #[serde(with = "base64_bytes")]
    pub body: Vec<u8>,
}

/// One captured request header. The value is kept byte-for-byte, including
/// bytes that are not visible ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookHeader {
    pub name: String,
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

impl WebhookHeader {
    pub fn new(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Raw bytes as a standard base64 string.
mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(bytes: T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
