use std::sync::Arc;

use chrono::Utc;

use silo_domain::id::{OrganizationId, SlugReservationId, UserId, snowflake_id};
use silo_domain::payload::SlugReservationType;
use silo_domain::region::RegionRegistry;
use silo_domain::slug::{alternate_slug, validate_slug};
use silo_outbox::{DrainSignal, OutboxBatch, RegionResolver};

use crate::domain::repository::{SlugReservationRepository, UserRepository};
use crate::domain::types::{
    MAX_ALTERNATE_SLUG_ATTEMPTS, OrganizationProvision, ProvisionedOrganization, SlugReservation,
};
use crate::error::ControlServiceError;

pub struct ProvisionOrganizationInput {
    pub owner_user_id: UserId,
    pub slug: String,
    pub name: String,
    pub region_name: String,
    /// Fail with `NotProvisioned` instead of falling back to an alternate slug.
    pub require_exact_slug: bool,
}

/// Reserve a slug and ask the home region to create the organization.
///
/// Safe to repeat: a second call with the same owner, slug and region
/// resolves to the organization the first call reserved, including when the
/// first call fell back to an alternate slug.
pub struct IdempotentProvisionUseCase<U, S, R>
where
    U: UserRepository,
    S: SlugReservationRepository,
    R: RegionResolver,
{
    pub users: U,
    pub reservations: S,
    pub resolver: R,
    pub regions: Arc<RegionRegistry>,
    pub drain: DrainSignal,
}

enum SlugClaim {
    Ours(ProvisionedOrganization),
    Taken,
    Free,
}

impl<U, S, R> IdempotentProvisionUseCase<U, S, R>
where
    U: UserRepository,
    S: SlugReservationRepository,
    R: RegionResolver,
{
    pub async fn execute(
        &self,
        input: ProvisionOrganizationInput,
    ) -> Result<ProvisionedOrganization, ControlServiceError> {
        if !validate_slug(&input.slug) {
            return Err(ControlServiceError::InvalidSlug);
        }
        if !self.regions.contains(&input.region_name) {
            return Err(ControlServiceError::UnknownRegion);
        }
        self.users
            .find_by_id(input.owner_user_id)
            .await?
            .ok_or(ControlServiceError::UserNotFound)?;

        if let Some(existing) = self.find_requested(&input).await? {
            return Ok(existing);
        }

        let mut candidate = input.slug.clone();
        for attempt in 0..=MAX_ALTERNATE_SLUG_ATTEMPTS {
            if attempt > 0 {
                candidate = alternate_slug(&input.slug);
            }

            match self.check_slug(&candidate, &input).await? {
                SlugClaim::Ours(existing) => return Ok(existing),
                SlugClaim::Taken if input.require_exact_slug => {
                    return Err(ControlServiceError::NotProvisioned);
                }
                SlugClaim::Taken => continue,
                SlugClaim::Free => {}
            }

            if let Some(provisioned) = self.reserve(&candidate, &input).await? {
                return Ok(provisioned);
            }

            // Lost the insert race. A concurrent call for the same request
            // may have won with this or another candidate.
            if let Some(existing) = self.find_requested(&input).await? {
                return Ok(existing);
            }
            if let SlugClaim::Ours(existing) = self.check_slug(&candidate, &input).await? {
                return Ok(existing);
            }
            if input.require_exact_slug {
                return Err(ControlServiceError::NotProvisioned);
            }
        }

        tracing::warn!(
            slug = %input.slug,
            owner = %input.owner_user_id,
            "no free alternate slug found"
        );
        Err(ControlServiceError::NotProvisioned)
    }

    async fn find_requested(
        &self,
        input: &ProvisionOrganizationInput,
    ) -> Result<Option<ProvisionedOrganization>, ControlServiceError> {
        let existing = self
            .reservations
            .find_by_request(input.owner_user_id, &input.slug, &input.region_name)
            .await?;
        Ok(existing.map(|reservation| ProvisionedOrganization {
            organization_id: reservation.organization_id,
            slug: reservation.slug,
        }))
    }

    async fn check_slug(
        &self,
        slug: &str,
        input: &ProvisionOrganizationInput,
    ) -> Result<SlugClaim, ControlServiceError> {
        let claim = match self.reservations.find_by_slug(slug).await? {
            None => SlugClaim::Free,
            Some(existing)
                if existing.user_id == input.owner_user_id
                    && existing.region_name == input.region_name =>
            {
                SlugClaim::Ours(ProvisionedOrganization {
                    organization_id: existing.organization_id,
                    slug: existing.slug,
                })
            }
            Some(_) => SlugClaim::Taken,
        };
        Ok(claim)
    }

    async fn reserve(
        &self,
        slug: &str,
        input: &ProvisionOrganizationInput,
    ) -> Result<Option<ProvisionedOrganization>, ControlServiceError> {
        let organization_id = OrganizationId(snowflake_id());
        let reservation = SlugReservation {
            id: SlugReservationId(snowflake_id()),
            slug: slug.to_owned(),
            requested_slug: input.slug.clone(),
            organization_id,
            user_id: input.owner_user_id,
            region_name: input.region_name.clone(),
            reservation_type: SlugReservationType::Primary,
            date_added: Utc::now(),
        };
        let provision = OrganizationProvision {
            organization_id,
            slug: slug.to_owned(),
            name: input.name.clone(),
            owner_user_id: input.owner_user_id,
            region_name: input.region_name.clone(),
        };

        let mut batch = OutboxBatch::new().flush_now();
        batch.produce_control(&reservation, &self.resolver).await?;
        batch.produce_control(&provision, &self.resolver).await?;

        let inserted = self
            .reservations
            .insert_if_absent_with_outbox(&reservation, batch.records())
            .await?;
        if !inserted {
            return Ok(None);
        }
        if batch.wants_flush() {
            self.drain.notify();
        }

        tracing::info!(
            organization_id = %organization_id,
            slug,
            region = %input.region_name,
            "organization provisioning scheduled"
        );
        Ok(Some(ProvisionedOrganization {
            organization_id,
            slug: slug.to_owned(),
        }))
    }
}
