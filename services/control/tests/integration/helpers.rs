use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use silo_control::domain::repository::{
    MappingRepository, OutboxWriter, SlugReservationRepository, UserRepository,
};
use silo_control::domain::types::{MemberMapping, OrganizationMapping, SlugReservation, User};
use silo_control::error::ControlServiceError;
use silo_domain::id::{OrganizationId, UserId};
use silo_domain::outbox::OutboxScope;
use silo_domain::region::{Region, RegionRegistry};
use silo_outbox::{NewOutbox, OutboxError, RegionResolver};

pub fn test_user() -> User {
    User {
        id: UserId(1001),
        email: "owner@example.com".to_owned(),
        name: "Owner".to_owned(),
        date_added: Utc::now(),
        date_updated: Utc::now(),
    }
}

pub fn registry() -> Arc<RegionRegistry> {
    Arc::new(
        RegionRegistry::new(vec![
            Region {
                name: "us".to_owned(),
                address: "http://us.internal:8200".to_owned(),
            },
            Region {
                name: "de".to_owned(),
                address: "http://de.internal:8200".to_owned(),
            },
        ])
        .unwrap(),
    )
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub outboxes: Arc<Mutex<Vec<NewOutbox>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            outboxes: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn outboxes_handle(&self) -> Arc<Mutex<Vec<NewOutbox>>> {
        Arc::clone(&self.outboxes)
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, ControlServiceError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn update_with_outbox(
        &self,
        user: &User,
        outboxes: &[NewOutbox],
    ) -> Result<(), ControlServiceError> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(())
    }
}

// ── MockSlugReservationRepo ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSlugReservationRepo {
    pub reservations: Arc<Mutex<Vec<SlugReservation>>>,
    pub outboxes: Arc<Mutex<Vec<NewOutbox>>>,
}

impl MockSlugReservationRepo {
    pub fn new(reservations: Vec<SlugReservation>) -> Self {
        Self {
            reservations: Arc::new(Mutex::new(reservations)),
            outboxes: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn reservations_handle(&self) -> Arc<Mutex<Vec<SlugReservation>>> {
        Arc::clone(&self.reservations)
    }

    pub fn outboxes_handle(&self) -> Arc<Mutex<Vec<NewOutbox>>> {
        Arc::clone(&self.outboxes)
    }
}

impl SlugReservationRepository for MockSlugReservationRepo {
    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<SlugReservation>, ControlServiceError> {
        // Yield so concurrent callers interleave between lookup and insert.
        tokio::task::yield_now().await;
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.slug == slug)
            .cloned())
    }

    async fn find_by_request(
        &self,
        user_id: UserId,
        requested_slug: &str,
        region_name: &str,
    ) -> Result<Option<SlugReservation>, ControlServiceError> {
        tokio::task::yield_now().await;
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .find(|r| {
                r.user_id == user_id
                    && r.requested_slug == requested_slug
                    && r.region_name == region_name
            })
            .cloned())
    }

    async fn insert_if_absent_with_outbox(
        &self,
        reservation: &SlugReservation,
        outboxes: &[NewOutbox],
    ) -> Result<bool, ControlServiceError> {
        tokio::task::yield_now().await;
        let mut reservations = self.reservations.lock().unwrap();
        if reservations.iter().any(|r| {
            r.slug == reservation.slug
                || (r.user_id == reservation.user_id
                    && r.requested_slug == reservation.requested_slug
                    && r.region_name == reservation.region_name)
        }) {
            return Ok(false);
        }
        reservations.push(reservation.clone());
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(true)
    }

    async fn delete_with_outbox(
        &self,
        reservation: &SlugReservation,
        outboxes: &[NewOutbox],
    ) -> Result<bool, ControlServiceError> {
        let mut reservations = self.reservations.lock().unwrap();
        let before = reservations.len();
        reservations.retain(|r| r.id != reservation.id);
        if reservations.len() == before {
            return Ok(false);
        }
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(true)
    }
}

// ── MockMappingRepo ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMappingRepo {
    pub organizations: Arc<Mutex<BTreeMap<OrganizationId, OrganizationMapping>>>,
    pub members: Arc<Mutex<BTreeMap<(OrganizationId, UserId), MemberMapping>>>,
}

impl MockMappingRepo {
    pub fn with_organization(mapping: OrganizationMapping) -> Self {
        let repo = Self::default();
        repo.organizations
            .lock()
            .unwrap()
            .insert(mapping.organization_id, mapping);
        repo
    }

    pub fn organizations_handle(
        &self,
    ) -> Arc<Mutex<BTreeMap<OrganizationId, OrganizationMapping>>> {
        Arc::clone(&self.organizations)
    }

    pub fn members_handle(&self) -> Arc<Mutex<BTreeMap<(OrganizationId, UserId), MemberMapping>>> {
        Arc::clone(&self.members)
    }
}

impl MappingRepository for MockMappingRepo {
    async fn find_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<OrganizationMapping>, ControlServiceError> {
        Ok(self
            .organizations
            .lock()
            .unwrap()
            .values()
            .find(|m| m.slug == slug)
            .cloned())
    }

    async fn upsert_organization(
        &self,
        mapping: &OrganizationMapping,
    ) -> Result<(), ControlServiceError> {
        self.organizations
            .lock()
            .unwrap()
            .insert(mapping.organization_id, mapping.clone());
        Ok(())
    }

    async fn delete_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<(), ControlServiceError> {
        self.organizations.lock().unwrap().remove(&organization_id);
        self.members
            .lock()
            .unwrap()
            .retain(|(org, _), _| *org != organization_id);
        Ok(())
    }

    async fn upsert_member(&self, member: &MemberMapping) -> Result<(), ControlServiceError> {
        self.members
            .lock()
            .unwrap()
            .insert((member.organization_id, member.user_id), member.clone());
        Ok(())
    }

    async fn delete_member(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<(), ControlServiceError> {
        self.members
            .lock()
            .unwrap()
            .remove(&(organization_id, user_id));
        Ok(())
    }

    async fn apply_provision(
        &self,
        mapping: &OrganizationMapping,
        owner: &MemberMapping,
    ) -> Result<(), ControlServiceError> {
        self.upsert_organization(mapping).await?;
        self.upsert_member(owner).await
    }
}

// ── MockOutboxWriter ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutboxWriter {
    pub outboxes: Arc<Mutex<Vec<NewOutbox>>>,
}

impl MockOutboxWriter {
    pub fn outboxes_handle(&self) -> Arc<Mutex<Vec<NewOutbox>>> {
        Arc::clone(&self.outboxes)
    }
}

impl OutboxWriter for MockOutboxWriter {
    async fn write(&self, outboxes: &[NewOutbox]) -> Result<(), ControlServiceError> {
        self.outboxes.lock().unwrap().extend_from_slice(outboxes);
        Ok(())
    }
}

// ── FixedResolver ────────────────────────────────────────────────────────────

/// Regions per user id; organizations resolve to nothing.
#[derive(Default)]
pub struct FixedResolver {
    pub user_regions: HashMap<i64, Vec<String>>,
}

impl FixedResolver {
    pub fn with_user(user_id: UserId, regions: &[&str]) -> Self {
        Self {
            user_regions: HashMap::from([(
                user_id.0,
                regions.iter().map(|r| r.to_string()).collect(),
            )]),
        }
    }
}

impl RegionResolver for FixedResolver {
    async fn regions_for(
        &self,
        scope: OutboxScope,
        shard_identifier: i64,
    ) -> Result<Vec<String>, OutboxError> {
        match scope {
            OutboxScope::User => Ok(self
                .user_regions
                .get(&shard_identifier)
                .cloned()
                .unwrap_or_default()),
            OutboxScope::Organization => Ok(vec![]),
            OutboxScope::Webhook => Err(OutboxError::UnresolvableScope(scope)),
        }
    }
}
