use chrono::Utc;

use silo_domain::id::{OrganizationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::{
    OrganizationMemberPayload, OrganizationUpdatePayload, PostProvisionPayload,
};
use silo_outbox::OutboxEnvelope;

use crate::domain::repository::MappingRepository;
use crate::domain::types::{MemberMapping, OWNER_ROLE, OrganizationMapping};
use crate::error::ControlServiceError;

/// Apply a region outbox message to the control-side replicas.
///
/// Every branch is an upsert or a delete keyed by the message identity, so a
/// redelivered message leaves the replicas unchanged.
pub struct ApplyRegionOutboxUseCase<M>
where
    M: MappingRepository,
{
    pub mappings: M,
}

impl<M> ApplyRegionOutboxUseCase<M>
where
    M: MappingRepository,
{
    pub async fn execute(&self, envelope: &OutboxEnvelope) -> Result<(), ControlServiceError> {
        let category = envelope.category()?;
        let now = Utc::now();

        match category {
            OutboxCategory::OrganizationUpdate => {
                match envelope.decode_payload::<OrganizationUpdatePayload>()? {
                    Some(org) => {
                        self.mappings
                            .upsert_organization(&OrganizationMapping {
                                organization_id: org.organization_id,
                                slug: org.slug,
                                name: org.name,
                                region_name: org.region_name,
                                date_updated: now,
                            })
                            .await
                    }
                    None => {
                        self.mappings
                            .delete_organization(OrganizationId(envelope.object_identifier))
                            .await
                    }
                }
            }
            OutboxCategory::OrganizationMemberUpdate => {
                match envelope.decode_payload::<OrganizationMemberPayload>()? {
                    Some(member) => {
                        self.mappings
                            .upsert_member(&MemberMapping {
                                organization_id: member.organization_id,
                                user_id: member.user_id,
                                role: member.role,
                                date_updated: now,
                            })
                            .await
                    }
                    None => {
                        self.mappings
                            .delete_member(
                                OrganizationId(envelope.shard_identifier),
                                UserId(envelope.object_identifier),
                            )
                            .await
                    }
                }
            }
            OutboxCategory::PostOrganizationProvision => {
                let Some(provisioned) = envelope.decode_payload::<PostProvisionPayload>()? else {
                    return Err(ControlServiceError::InvalidEnvelope(
                        "post-provision message without payload".to_owned(),
                    ));
                };
                let mapping = OrganizationMapping {
                    organization_id: provisioned.organization_id,
                    slug: provisioned.slug,
                    name: provisioned.name,
                    region_name: provisioned.region_name,
                    date_updated: now,
                };
                let owner = MemberMapping {
                    organization_id: provisioned.organization_id,
                    user_id: provisioned.owner_user_id,
                    role: OWNER_ROLE.to_owned(),
                    date_updated: now,
                };
                self.mappings.apply_provision(&mapping, &owner).await
            }
            OutboxCategory::UserUpdate
            | OutboxCategory::WebhookProxy
            | OutboxCategory::OrganizationSlugReservationUpdate
            | OutboxCategory::ProvisionOrganization => Err(ControlServiceError::InvalidEnvelope(
                format!("{category} is not a region-to-control category"),
            )),
        }
    }
}
