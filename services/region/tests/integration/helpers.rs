use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_outbox::{
    DeliveryError, DrainSignal, NewOutbox, OutboxDelivery, OutboxEnvelope, OutboxRecord,
};
use silo_region::domain::repository::{
    MemberRepository, OrganizationRepository, ReplicaRepository,
};
use silo_region::domain::types::{Member, Organization, SlugReservationReplica, UserReplica};
use silo_region::error::RegionServiceError;
use silo_region::usecase::apply::ApplyControlOutboxUseCase;

pub const REGION: &str = "us";

pub fn acme() -> Organization {
    Organization {
        id: OrganizationId(70),
        slug: "acme".to_owned(),
        name: "Acme".to_owned(),
        date_added: Utc::now(),
        date_updated: Utc::now(),
    }
}

pub fn envelope(record: &NewOutbox) -> OutboxEnvelope {
    record.clone().into_record(1, Utc::now()).envelope()
}

// ── MockOrganizationRepo ─────────────────────────────────────────────────────

/// Organizations and memberships behind one lock, as they share a database.
#[derive(Clone, Default)]
pub struct MockOrganizationRepo {
    pub organizations: Arc<Mutex<BTreeMap<OrganizationId, Organization>>>,
    pub members: Arc<Mutex<BTreeMap<(OrganizationId, UserId), Member>>>,
    pub outboxes: Arc<Mutex<Vec<NewOutbox>>>,
}

impl MockOrganizationRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(organization: Organization) -> Self {
        let repo = Self::new();
        repo.organizations
            .lock()
            .unwrap()
            .insert(organization.id, organization);
        repo
    }

    pub fn with_member(self, member: Member) -> Self {
        self.members
            .lock()
            .unwrap()
            .insert((member.organization_id, member.user_id), member);
        self
    }

    pub fn outboxes(&self) -> Vec<NewOutbox> {
        self.outboxes.lock().unwrap().clone()
    }
}

impl OrganizationRepository for MockOrganizationRepo {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, RegionServiceError> {
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .values()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn update_with_outbox(
        &self,
        organization: &Organization,
        outboxes: &[NewOutbox],
    ) -> Result<(), RegionServiceError> {
        self.organizations
            .lock()
            .unwrap()
            .insert(organization.id, organization.clone());
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(())
    }

    async fn create_with_owner_and_outbox(
        &self,
        organization: &Organization,
        owner: &Member,
        outboxes: &[NewOutbox],
    ) -> Result<bool, RegionServiceError> {
        let mut organizations = self.organizations.lock().unwrap();
        if organizations.contains_key(&organization.id) {
            return Ok(false);
        }
        organizations.insert(organization.id, organization.clone());
        self.members
            .lock()
            .unwrap()
            .entry((owner.organization_id, owner.user_id))
            .or_insert_with(|| owner.clone());
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(true)
    }
}

impl MemberRepository for MockOrganizationRepo {
    async fn find(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<Member>, RegionServiceError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&(organization_id, user_id))
            .cloned())
    }

    async fn upsert_with_outbox(
        &self,
        member: &Member,
        outboxes: &[NewOutbox],
    ) -> Result<(), RegionServiceError> {
        self.members
            .lock()
            .unwrap()
            .insert((member.organization_id, member.user_id), member.clone());
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(())
    }

    async fn delete_with_outbox(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        outboxes: &[NewOutbox],
    ) -> Result<bool, RegionServiceError> {
        let removed = self
            .members
            .lock()
            .unwrap()
            .remove(&(organization_id, user_id));
        if removed.is_none() {
            return Ok(false);
        }
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(true)
    }
}

// ── MockReplicaRepo ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockReplicaRepo {
    pub users: Arc<Mutex<BTreeMap<UserId, UserReplica>>>,
    pub reservations: Arc<Mutex<BTreeMap<SlugReservationId, SlugReservationReplica>>>,
}

impl MockReplicaRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, user_id: UserId) -> Option<UserReplica> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    pub fn reservation(&self, id: SlugReservationId) -> Option<SlugReservationReplica> {
        self.reservations.lock().unwrap().get(&id).cloned()
    }
}

impl ReplicaRepository for MockReplicaRepo {
    async fn upsert_user(&self, user: &UserReplica) -> Result<(), RegionServiceError> {
        self.users.lock().unwrap().insert(user.user_id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: UserId) -> Result<(), RegionServiceError> {
        self.users.lock().unwrap().remove(&user_id);
        Ok(())
    }

    async fn upsert_slug_reservation(
        &self,
        reservation: &SlugReservationReplica,
    ) -> Result<(), RegionServiceError> {
        self.reservations
            .lock()
            .unwrap()
            .insert(reservation.reservation_id, reservation.clone());
        Ok(())
    }

    async fn delete_slug_reservation(
        &self,
        reservation_id: SlugReservationId,
    ) -> Result<(), RegionServiceError> {
        self.reservations.lock().unwrap().remove(&reservation_id);
        Ok(())
    }

    async fn find_slug_reservation(
        &self,
        slug: &str,
    ) -> Result<Option<SlugReservationReplica>, RegionServiceError> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.slug == slug)
            .max_by_key(|r| r.date_updated)
            .cloned())
    }
}

pub fn apply_usecase(
    organizations: &MockOrganizationRepo,
    replicas: &MockReplicaRepo,
) -> ApplyControlOutboxUseCase<MockOrganizationRepo, MockReplicaRepo> {
    ApplyControlOutboxUseCase {
        organizations: organizations.clone(),
        replicas: replicas.clone(),
        region_name: REGION.to_owned(),
        drain: DrainSignal::new(),
    }
}

// ── ApplyingDelivery ─────────────────────────────────────────────────────────

/// Delivery that hands each envelope straight to this region's receiver,
/// counting how many it was given.
#[derive(Default)]
pub struct ApplyingDelivery {
    pub organizations: MockOrganizationRepo,
    pub replicas: MockReplicaRepo,
    pub delivered: Mutex<Vec<OutboxEnvelope>>,
}

impl ApplyingDelivery {
    pub fn delivered(&self) -> Vec<OutboxEnvelope> {
        self.delivered.lock().unwrap().clone()
    }
}

impl OutboxDelivery for ApplyingDelivery {
    async fn deliver(&self, record: &OutboxRecord) -> Result<(), DeliveryError> {
        let envelope = record.envelope();
        apply_usecase(&self.organizations, &self.replicas)
            .execute(&envelope)
            .await
            .map_err(|e| DeliveryError::Transient(e.into()))?;
        self.delivered.lock().unwrap().push(envelope);
        Ok(())
    }
}
