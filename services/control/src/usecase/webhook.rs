use silo_domain::id::snowflake_id;
use silo_domain::payload::WebhookPayload;
use silo_outbox::{DrainSignal, OutboxBatch, RegionResolver};

use crate::domain::repository::{MappingRepository, OutboxWriter};
use crate::domain::types::InboundWebhook;
use crate::error::ControlServiceError;

pub struct EnqueueWebhookInput {
    pub organization_slug: String,
    pub request: WebhookPayload,
}

/// Store an inbound webhook for verbatim replay against the organization's
/// region.
pub struct EnqueueWebhookUseCase<M, W, R>
where
    M: MappingRepository,
    W: OutboxWriter,
    R: RegionResolver,
{
    pub mappings: M,
    pub outboxes: W,
    pub resolver: R,
    pub drain: DrainSignal,
}

impl<M, W, R> EnqueueWebhookUseCase<M, W, R>
where
    M: MappingRepository,
    W: OutboxWriter,
    R: RegionResolver,
{
    pub async fn execute(&self, input: EnqueueWebhookInput) -> Result<i64, ControlServiceError> {
        let organization = self
            .mappings
            .find_organization_by_slug(&input.organization_slug)
            .await?
            .ok_or(ControlServiceError::OrganizationNotFound)?;

        let webhook = InboundWebhook {
            id: snowflake_id(),
            organization_id: organization.organization_id,
            region_name: organization.region_name,
            request: input.request,
        };
        let mut batch = OutboxBatch::new().flush_now();
        batch.produce_control(&webhook, &self.resolver).await?;
        self.outboxes.write(batch.records()).await?;
        if batch.wants_flush() {
            self.drain.notify();
        }
        Ok(webhook.id)
    }
}
