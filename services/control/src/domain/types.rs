use chrono::{DateTime, Utc};
use serde_json::Value;

use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::{
    ProvisionOrganizationPayload, SlugReservationPayload, SlugReservationType, UserUpdatePayload,
    WebhookPayload,
};
use silo_outbox::{OutboxError, OutboxProducer, encode_payload};

/// Attempts at an alternate slug before provisioning gives up.
pub const MAX_ALTERNATE_SLUG_ATTEMPTS: usize = 5;

/// Role granted to the user who provisioned an organization.
pub const OWNER_ROLE: &str = "owner";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub date_added: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Fans out to every region the user is a member in.
impl OutboxProducer for User {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::UserUpdate
    }

    fn shard_identifier(&self) -> i64 {
        self.id.0
    }

    fn object_identifier(&self) -> i64 {
        self.id.0
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        let payload = UserUpdatePayload {
            user_id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
        };
        encode_payload(self.outbox_category(), &payload).map(Some)
    }
}

/// Control-side replica of a region organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationMapping {
    pub organization_id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub region_name: String,
    pub date_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberMapping {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub role: String,
    pub date_updated: DateTime<Utc>,
}

/// System-of-record slug reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugReservation {
    pub id: SlugReservationId,
    pub slug: String,
    /// Slug the owner asked for; differs from `slug` when an alternate was
    /// handed out.
    pub requested_slug: String,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub region_name: String,
    pub reservation_type: SlugReservationType,
    pub date_added: DateTime<Utc>,
}

impl SlugReservation {
    fn payload(&self) -> SlugReservationPayload {
        SlugReservationPayload {
            reservation_id: self.id,
            slug: self.slug.clone(),
            organization_id: self.organization_id,
            user_id: self.user_id,
            region_name: self.region_name.clone(),
            reservation_type: self.reservation_type,
        }
    }
}

impl OutboxProducer for SlugReservation {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::OrganizationSlugReservationUpdate
    }

    fn shard_identifier(&self) -> i64 {
        self.organization_id.0
    }

    fn object_identifier(&self) -> i64 {
        self.id.0
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        encode_payload(self.outbox_category(), &self.payload()).map(Some)
    }

    fn target_regions(&self) -> Option<Vec<String>> {
        Some(vec![self.region_name.clone()])
    }
}

/// A reservation that has just been deleted; replicates as a null payload.
#[derive(Debug, Clone)]
pub struct ReleasedSlugReservation(pub SlugReservation);

impl OutboxProducer for ReleasedSlugReservation {
    fn outbox_category(&self) -> OutboxCategory {
        self.0.outbox_category()
    }

    fn shard_identifier(&self) -> i64 {
        self.0.shard_identifier()
    }

    fn object_identifier(&self) -> i64 {
        self.0.object_identifier()
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        Ok(None)
    }

    fn target_regions(&self) -> Option<Vec<String>> {
        self.0.target_regions()
    }
}

/// Request to create an organization in its home region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationProvision {
    pub organization_id: OrganizationId,
    pub slug: String,
    pub name: String,
    pub owner_user_id: UserId,
    pub region_name: String,
}

impl OutboxProducer for OrganizationProvision {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::ProvisionOrganization
    }

    fn shard_identifier(&self) -> i64 {
        self.organization_id.0
    }

    fn object_identifier(&self) -> i64 {
        self.organization_id.0
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        let payload = ProvisionOrganizationPayload {
            organization_id: self.organization_id,
            slug: self.slug.clone(),
            name: self.name.clone(),
            owner_user_id: self.owner_user_id,
        };
        encode_payload(self.outbox_category(), &payload).map(Some)
    }

    fn target_regions(&self) -> Option<Vec<String>> {
        Some(vec![self.region_name.clone()])
    }
}

/// Third-party webhook received by control and relayed to the owning region.
///
/// Each webhook is its own object so deliveries never collapse into one
/// another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundWebhook {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub region_name: String,
    pub request: WebhookPayload,
}

impl OutboxProducer for InboundWebhook {
    fn outbox_category(&self) -> OutboxCategory {
        OutboxCategory::WebhookProxy
    }

    fn shard_identifier(&self) -> i64 {
        self.organization_id.0
    }

    fn object_identifier(&self) -> i64 {
        self.id
    }

    fn outbox_payload(&self) -> Result<Option<Value>, OutboxError> {
        encode_payload(self.outbox_category(), &self.request).map(Some)
    }

    fn target_regions(&self) -> Option<Vec<String>> {
        Some(vec![self.region_name.clone()])
    }
}

/// Outcome of a successful provisioning call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProvisionedOrganization {
    pub organization_id: OrganizationId,
    pub slug: String,
}
