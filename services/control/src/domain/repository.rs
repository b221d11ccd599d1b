#![allow(async_fn_in_trait)]

use silo_domain::id::{OrganizationId, UserId};
use silo_outbox::NewOutbox;

use crate::domain::types::{MemberMapping, OrganizationMapping, SlugReservation, User};
use crate::error::ControlServiceError;

pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ControlServiceError>;

    /// Persist `user` and its outbox records in one transaction.
    async fn update_with_outbox(
        &self,
        user: &User,
        outboxes: &[NewOutbox],
    ) -> Result<(), ControlServiceError>;
}

/// Control-side replicas of region organizations and memberships.
///
/// Only the region outbox receiver writes through this repository.
pub trait MappingRepository: Send + Sync {
    async fn find_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<OrganizationMapping>, ControlServiceError>;

    async fn upsert_organization(
        &self,
        mapping: &OrganizationMapping,
    ) -> Result<(), ControlServiceError>;

    async fn delete_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<(), ControlServiceError>;

    async fn upsert_member(&self, member: &MemberMapping) -> Result<(), ControlServiceError>;

    async fn delete_member(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<(), ControlServiceError>;

    /// Upsert the mapping and its owner membership atomically.
    async fn apply_provision(
        &self,
        mapping: &OrganizationMapping,
        owner: &MemberMapping,
    ) -> Result<(), ControlServiceError>;
}

pub trait SlugReservationRepository: Send + Sync {
    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<SlugReservation>, ControlServiceError>;

    /// Reservation an earlier call made for the same owner, requested slug
    /// and region, whatever slug it ended up with.
    async fn find_by_request(
        &self,
        user_id: UserId,
        requested_slug: &str,
        region_name: &str,
    ) -> Result<Option<SlugReservation>, ControlServiceError>;

    /// Insert `reservation` unless its slug, or its (owner, requested slug,
    /// region) request, is already taken, writing `outboxes` in the same
    /// transaction. Returns `false` on conflict; nothing is written then.
    async fn insert_if_absent_with_outbox(
        &self,
        reservation: &SlugReservation,
        outboxes: &[NewOutbox],
    ) -> Result<bool, ControlServiceError>;

    /// Delete the reservation and write `outboxes` atomically. Returns `false`
    /// if it was already gone.
    async fn delete_with_outbox(
        &self,
        reservation: &SlugReservation,
        outboxes: &[NewOutbox],
    ) -> Result<bool, ControlServiceError>;
}

/// Writes outbox records that have no accompanying entity mutation.
pub trait OutboxWriter: Send + Sync {
    async fn write(&self, outboxes: &[NewOutbox]) -> Result<(), ControlServiceError>;
}
