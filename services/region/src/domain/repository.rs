#![allow(async_fn_in_trait)]

use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_outbox::NewOutbox;

use crate::domain::types::{Member, Organization, SlugReservationReplica, UserReplica};
use crate::error::RegionServiceError;

pub trait OrganizationRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, RegionServiceError>;

    /// Persist `organization` and its outbox records in one transaction.
    async fn update_with_outbox(
        &self,
        organization: &Organization,
        outboxes: &[NewOutbox],
    ) -> Result<(), RegionServiceError>;

    /// Insert `organization` and its owner unless an organization with the
    /// same id exists, writing `outboxes` in the same transaction. Returns
    /// `false` (and writes nothing) when it already existed.
    async fn create_with_owner_and_outbox(
        &self,
        organization: &Organization,
        owner: &Member,
        outboxes: &[NewOutbox],
    ) -> Result<bool, RegionServiceError>;
}

pub trait MemberRepository: Send + Sync {
    async fn find(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<Member>, RegionServiceError>;

    async fn upsert_with_outbox(
        &self,
        member: &Member,
        outboxes: &[NewOutbox],
    ) -> Result<(), RegionServiceError>;

    /// Returns `false` if the membership was already gone.
    async fn delete_with_outbox(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        outboxes: &[NewOutbox],
    ) -> Result<bool, RegionServiceError>;
}

/// Replicas of control-owned data. Only the control outbox receiver writes
/// through this repository, and nothing written here produces outboxes.
pub trait ReplicaRepository: Send + Sync {
    async fn upsert_user(&self, user: &UserReplica) -> Result<(), RegionServiceError>;

    async fn delete_user(&self, user_id: UserId) -> Result<(), RegionServiceError>;

    async fn upsert_slug_reservation(
        &self,
        reservation: &SlugReservationReplica,
    ) -> Result<(), RegionServiceError>;

    async fn delete_slug_reservation(
        &self,
        reservation_id: SlugReservationId,
    ) -> Result<(), RegionServiceError>;

    /// Newest replica holding `slug`.
    async fn find_slug_reservation(
        &self,
        slug: &str,
    ) -> Result<Option<SlugReservationReplica>, RegionServiceError>;
}
