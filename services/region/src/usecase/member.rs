use chrono::Utc;

use silo_domain::id::UserId;
use silo_outbox::OutboxProducer;

use crate::domain::repository::{MemberRepository, OrganizationRepository};
use crate::domain::types::{Member, RemovedMember};
use crate::error::RegionServiceError;

pub struct UpsertMemberInput {
    pub slug: String,
    pub user_id: UserId,
    pub role: String,
}

/// Add a member or change their role.
pub struct UpsertMemberUseCase<O, M>
where
    O: OrganizationRepository,
    M: MemberRepository,
{
    pub organizations: O,
    pub members: M,
}

impl<O, M> UpsertMemberUseCase<O, M>
where
    O: OrganizationRepository,
    M: MemberRepository,
{
    pub async fn execute(&self, input: UpsertMemberInput) -> Result<Member, RegionServiceError> {
        let organization = self
            .organizations
            .find_by_slug(&input.slug)
            .await?
            .ok_or(RegionServiceError::OrganizationNotFound)?;

        let date_added = self
            .members
            .find(organization.id, input.user_id)
            .await?
            .map(|existing| existing.date_added)
            .unwrap_or_else(Utc::now);
        let member = Member {
            organization_id: organization.id,
            user_id: input.user_id,
            role: input.role,
            date_added,
        };
        let outbox = member.region_outbox_for_update()?;
        self.members.upsert_with_outbox(&member, &[outbox]).await?;
        Ok(member)
    }
}

pub struct RemoveMemberUseCase<O, M>
where
    O: OrganizationRepository,
    M: MemberRepository,
{
    pub organizations: O,
    pub members: M,
}

impl<O, M> RemoveMemberUseCase<O, M>
where
    O: OrganizationRepository,
    M: MemberRepository,
{
    pub async fn execute(&self, slug: &str, user_id: UserId) -> Result<(), RegionServiceError> {
        let organization = self
            .organizations
            .find_by_slug(slug)
            .await?
            .ok_or(RegionServiceError::OrganizationNotFound)?;

        let removed = RemovedMember {
            organization_id: organization.id,
            user_id,
        };
        let outbox = removed.region_outbox_for_update()?;
        if !self
            .members
            .delete_with_outbox(organization.id, user_id, &[outbox])
            .await?
        {
            return Err(RegionServiceError::MemberNotFound);
        }
        Ok(())
    }
}
