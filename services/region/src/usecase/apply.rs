use chrono::Utc;

use silo_domain::id::{SlugReservationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::{
    ProvisionOrganizationPayload, SlugReservationPayload, UserUpdatePayload,
};
use silo_outbox::{DrainSignal, OutboxEnvelope};

use crate::domain::repository::{OrganizationRepository, ReplicaRepository};
use crate::domain::types::{SlugReservationReplica, UserReplica};
use crate::error::RegionServiceError;
use crate::usecase::provision::ProvisionOrganizationUseCase;

/// Apply a control outbox message addressed to this region.
///
/// Replica writes are upserts or deletes keyed by the message identity and
/// provisioning is create-if-absent, so a redelivered message is a no-op.
pub struct ApplyControlOutboxUseCase<O, R>
where
    O: OrganizationRepository,
    R: ReplicaRepository,
{
    pub organizations: O,
    pub replicas: R,
    pub region_name: String,
    pub drain: DrainSignal,
}

impl<O, R> ApplyControlOutboxUseCase<O, R>
where
    O: OrganizationRepository,
    R: ReplicaRepository,
{
    /// Consumes the use case: provisioning hands its repository on to
    /// [`ProvisionOrganizationUseCase`].
    pub async fn execute(self, envelope: &OutboxEnvelope) -> Result<(), RegionServiceError> {
        let category = envelope.category()?;
        if let Some(target) = envelope
            .region_name
            .as_deref()
            .filter(|target| *target != self.region_name)
        {
            return Err(RegionServiceError::InvalidEnvelope(format!(
                "message for region {target} delivered to {}",
                self.region_name
            )));
        }
        let now = Utc::now();

        match category {
            OutboxCategory::UserUpdate => match envelope.decode_payload::<UserUpdatePayload>()? {
                Some(user) => {
                    self.replicas
                        .upsert_user(&UserReplica {
                            user_id: user.user_id,
                            email: user.email,
                            name: user.name,
                            date_updated: now,
                        })
                        .await
                }
                None => {
                    self.replicas
                        .delete_user(UserId(envelope.object_identifier))
                        .await
                }
            },
            OutboxCategory::OrganizationSlugReservationUpdate => {
                match envelope.decode_payload::<SlugReservationPayload>()? {
                    Some(reservation) => {
                        self.replicas
                            .upsert_slug_reservation(&SlugReservationReplica {
                                reservation_id: reservation.reservation_id,
                                slug: reservation.slug,
                                organization_id: reservation.organization_id,
                                user_id: reservation.user_id,
                                region_name: reservation.region_name,
                                reservation_type: reservation.reservation_type,
                                date_updated: now,
                            })
                            .await
                    }
                    None => {
                        self.replicas
                            .delete_slug_reservation(SlugReservationId(
                                envelope.object_identifier,
                            ))
                            .await
                    }
                }
            }
            OutboxCategory::ProvisionOrganization => {
                let Some(request) = envelope.decode_payload::<ProvisionOrganizationPayload>()?
                else {
                    return Err(RegionServiceError::InvalidEnvelope(
                        "provision message without payload".to_owned(),
                    ));
                };
                let usecase = ProvisionOrganizationUseCase {
                    organizations: self.organizations,
                    region_name: self.region_name,
                    drain: self.drain,
                };
                usecase.execute(request).await.map(|_| ())
            }
            OutboxCategory::WebhookProxy => Err(RegionServiceError::InvalidEnvelope(
                "webhooks are replayed, not posted as envelopes".to_owned(),
            )),
            OutboxCategory::OrganizationUpdate
            | OutboxCategory::OrganizationMemberUpdate
            | OutboxCategory::PostOrganizationProvision => {
                Err(RegionServiceError::InvalidEnvelope(format!(
                    "{category} is not a control-to-region category"
                )))
            }
        }
    }
}
