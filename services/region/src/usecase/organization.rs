use chrono::Utc;

use silo_outbox::OutboxBatch;

use crate::domain::repository::OrganizationRepository;
use crate::domain::types::{HomedOrganization, Organization};
use crate::error::RegionServiceError;

pub struct GetOrganizationUseCase<O>
where
    O: OrganizationRepository,
{
    pub organizations: O,
}

impl<O> GetOrganizationUseCase<O>
where
    O: OrganizationRepository,
{
    pub async fn execute(&self, slug: &str) -> Result<Organization, RegionServiceError> {
        self.organizations
            .find_by_slug(slug)
            .await?
            .ok_or(RegionServiceError::OrganizationNotFound)
    }
}

pub struct UpdateOrganizationInput {
    pub slug: String,
    pub name: Option<String>,
}

/// Update region-owned organization fields; control's mapping follows
/// through an `OrganizationUpdate` outbox.
pub struct UpdateOrganizationUseCase<O>
where
    O: OrganizationRepository,
{
    pub organizations: O,
    pub region_name: String,
}

impl<O> UpdateOrganizationUseCase<O>
where
    O: OrganizationRepository,
{
    pub async fn execute(
        &self,
        input: UpdateOrganizationInput,
    ) -> Result<Organization, RegionServiceError> {
        let mut organization = self
            .organizations
            .find_by_slug(&input.slug)
            .await?
            .ok_or(RegionServiceError::OrganizationNotFound)?;

        if let Some(name) = input.name {
            organization.name = name;
        }
        organization.date_updated = Utc::now();

        let mut batch = OutboxBatch::new();
        batch.produce_region(&HomedOrganization {
            organization: &organization,
            region_name: &self.region_name,
        })?;
        self.organizations
            .update_with_outbox(&organization, batch.records())
            .await?;
        Ok(organization)
    }
}
