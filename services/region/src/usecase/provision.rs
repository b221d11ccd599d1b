use chrono::Utc;

use silo_domain::payload::ProvisionOrganizationPayload;
use silo_outbox::{DrainSignal, OutboxBatch};

use crate::domain::repository::OrganizationRepository;
use crate::domain::types::{Member, OWNER_ROLE, Organization, ProvisionConfirmation};
use crate::error::RegionServiceError;

/// Create the organization control reserved, with its owner, and confirm
/// back to control.
///
/// The organization id is allocated by control, so a redelivered request
/// finds the row already present and changes nothing.
pub struct ProvisionOrganizationUseCase<O>
where
    O: OrganizationRepository,
{
    pub organizations: O,
    pub region_name: String,
    pub drain: DrainSignal,
}

impl<O> ProvisionOrganizationUseCase<O>
where
    O: OrganizationRepository,
{
    /// Returns `true` when the organization was created by this call.
    pub async fn execute(
        &self,
        request: ProvisionOrganizationPayload,
    ) -> Result<bool, RegionServiceError> {
        let now = Utc::now();
        let organization = Organization {
            id: request.organization_id,
            slug: request.slug,
            name: request.name,
            date_added: now,
            date_updated: now,
        };
        let owner = Member {
            organization_id: organization.id,
            user_id: request.owner_user_id,
            role: OWNER_ROLE.to_owned(),
            date_added: now,
        };

        let mut batch = OutboxBatch::new().flush_now();
        batch.produce_region(&ProvisionConfirmation {
            organization: &organization,
            owner_user_id: owner.user_id,
            region_name: &self.region_name,
        })?;

        let created = self
            .organizations
            .create_with_owner_and_outbox(&organization, &owner, batch.records())
            .await?;
        if !created {
            tracing::debug!(
                organization_id = %organization.id,
                "organization already provisioned"
            );
            return Ok(false);
        }
        if batch.wants_flush() {
            self.drain.notify();
        }

        tracing::info!(
            organization_id = %organization.id,
            slug = %organization.slug,
            owner = %owner.user_id,
            "organization provisioned"
        );
        Ok(true)
    }
}
