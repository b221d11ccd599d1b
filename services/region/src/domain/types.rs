use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::{
    OrganizationMemberPayload, OrganizationUpdatePayload, PostProvisionPayload,
    SlugReservationType,
};
use silo_outbox::{OutboxError, OutboxProducer, encode_payload};

/// Role granted to the user an organization was provisioned for.
pub const OWNER_ROLE: &str = "owner";

/// Organization owned by this region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub slug: String,
    pub name: String,
    #[serde(serialize_with = "silo_core::serde::to_rfc3339_ms")]
    pub date_added: DateTime<Utc>,
    #[serde(serialize_with = "silo_core::serde::to_rfc3339_ms")]
    pub date_updated: DateTime<Utc>,
}

/// An organization as control mirrors it: tagged with the region that owns it.
#[derive(Debug, Clone)]
pub struct HomedOrganization<'a> {
    pub organization: &'a Organization,
    pub region_name: &'a str,
}

impl OutboxProducer for HomedOrganization<'_> {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::OrganizationUpdate
    }

    fn shard_identifier(&self) -> i64 {
        self.organization.id.0
    }

    fn object_identifier(&self) -> i64 {
        self.organization.id.0
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        let payload = OrganizationUpdatePayload {
            organization_id: self.organization.id,
            slug: self.organization.slug.clone(),
            name: self.organization.name.clone(),
            region_name: self.region_name.to_owned(),
        };
        encode_payload(self.outbox_category(), &payload).map(Some)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: String,
    #[serde(serialize_with = "silo_core::serde::to_rfc3339_ms")]
    pub date_added: DateTime<Utc>,
}

impl OutboxProducer for Member {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::OrganizationMemberUpdate
    }

    fn shard_identifier(&self) -> i64 {
        self.organization_id.0
    }

    fn object_identifier(&self) -> i64 {
        self.user_id.0
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        let payload = OrganizationMemberPayload {
            organization_id: self.organization_id,
            user_id: self.user_id,
            role: self.role.clone(),
        };
        encode_payload(self.outbox_category(), &payload).map(Some)
    }
}

/// A membership that has just been deleted; replicates as a null payload.
#[derive(Debug, Clone)]
pub struct RemovedMember {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
}

impl OutboxProducer for RemovedMember {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::OrganizationMemberUpdate
    }

    fn shard_identifier(&self) -> i64 {
        self.organization_id.0
    }

    fn object_identifier(&self) -> i64 {
        self.user_id.0
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        Ok(None)
    }
}

/// Confirmation sent to control once a provisioned organization exists here.
#[derive(Debug, Clone)]
pub struct ProvisionConfirmation<'a> {
    pub organization: &'a Organization,
    pub owner_user_id: UserId,
    pub region_name: &'a str,
}

impl OutboxProducer for ProvisionConfirmation<'_> {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::PostOrganizationProvision
    }

    fn shard_identifier(&self) -> i64 {
        self.organization.id.0
    }

    fn object_identifier(&self) -> i64 {
        self.organization.id.0
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        let payload = PostProvisionPayload {
            organization_id: self.organization.id,
            slug: self.organization.slug.clone(),
            name: self.organization.name.clone(),
            owner_user_id: self.owner_user_id,
            region_name: self.region_name.to_owned(),
        };
        encode_payload(self.outbox_category(), &payload).map(Some)
    }
}

/// Region-local copy of a control user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReplica {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub date_updated: DateTime<Utc>,
}

/// Region-local copy of a control slug reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugReservationReplica {
    pub reservation_id: SlugReservationId,
    pub slug: String,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub region_name: String,
    pub reservation_type: SlugReservationType,
    #[serde(serialize_with = "silo_core::serde::to_rfc3339_ms")]
    pub date_updated: DateTime<Utc>,
}
