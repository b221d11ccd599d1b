//! Outbox scopes and categories.
//!
//! Wire format: `i32` codes stored in the outbox tables and sent in delivery
//! envelopes. Codes are frozen; new variants get the next unused code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sharding granularity of an outbox message. Records in different scopes are
/// never coalesced together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxScope {
    Organization = 0,
    User = 1,
    Webhook = 2,
}

impl OutboxScope {
    pub const ALL: [Self; 3] = [Self::Organization, Self::User, Self::Webhook];

    /// Convert from `i32` wire value. Returns `None` for unknown values.
    pub fn from_i32(v: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_i32() == v)
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for OutboxScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Organization => "organization",
            Self::User => "user",
            Self::Webhook => "webhook",
        };
        f.write_str(name)
    }
}

/// Which database a category's records live in and where they are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxDirection {
    /// Written in a Region database, delivered to Control.
    RegionToControl,
    /// Written in the Control database, delivered to one named Region.
    ControlToRegion,
}

/// Semantic kind of a cross-silo change. Payload shape is category-specific
/// (see [`crate::payload`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxCategory {
    UserUpdate = 0,
    WebhookProxy = 1,
    OrganizationUpdate = 2,
    OrganizationMemberUpdate = 3,
    OrganizationSlugReservationUpdate = 4,
    ProvisionOrganization = 5,
    PostOrganizationProvision = 6,
}

impl OutboxCategory {
    pub const ALL: [Self; 7] = [
        Self::UserUpdate,
        Self::WebhookProxy,
        Self::OrganizationUpdate,
        Self::OrganizationMemberUpdate,
        Self::OrganizationSlugReservationUpdate,
        Self::ProvisionOrganization,
        Self::PostOrganizationProvision,
    ];

    /// Convert from `i32` wire value. Returns `None` for unknown values.
    pub fn from_i32(v: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_i32() == v)
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// The only scope records of this category may be sharded under.
    pub fn scope(self) -> OutboxScope {
        match self {
            Self::UserUpdate => OutboxScope::User,
            Self::WebhookProxy => OutboxScope::Webhook,
            Self::OrganizationUpdate
            | Self::OrganizationMemberUpdate
            | Self::OrganizationSlugReservationUpdate
            | Self::ProvisionOrganization
            | Self::PostOrganizationProvision => OutboxScope::Organization,
        }
    }

    pub fn direction(self) -> OutboxDirection {
        match self {
            Self::UserUpdate
            | Self::WebhookProxy
            | Self::OrganizationSlugReservationUpdate
            | Self::ProvisionOrganization => OutboxDirection::ControlToRegion,
            Self::OrganizationUpdate
            | Self::OrganizationMemberUpdate
            | Self::PostOrganizationProvision => OutboxDirection::RegionToControl,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserUpdate => "user_update",
            Self::WebhookProxy => "webhook_proxy",
            Self::OrganizationUpdate => "organization_update",
            Self::OrganizationMemberUpdate => "organization_member_update",
            Self::OrganizationSlugReservationUpdate => "organization_slug_reservation_update",
            Self::ProvisionOrganization => "provision_organization",
            Self::PostOrganizationProvision => "post_organization_provision",
        }
    }
}

impl fmt::Display for OutboxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
