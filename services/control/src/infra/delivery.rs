use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::WebhookPayload;
use silo_outbox::{DeliveryError, OutboxDelivery, OutboxRecord};
use silo_rpc::{OUTBOX_RECEIVER_PATH, RequestAttemptCache, SiloClient};

/// Delivers control outbox records to the region named on each record.
///
/// Webhooks are replayed verbatim against the region; everything else is
/// posted as an envelope to the region's outbox receiver.
pub struct RegionDelivery<C> {
    clients: Arc<BTreeMap<String, SiloClient<C>>>,
}

impl<C: RequestAttemptCache> RegionDelivery<C> {
    pub fn new(clients: Arc<BTreeMap<String, SiloClient<C>>>) -> Self {
        Self { clients }
    }

    async fn replay_webhook(
        &self,
        client: &SiloClient<C>,
        record: &OutboxRecord,
        prefix: &str,
    ) -> Result<(), DeliveryError> {
        let Some(webhook) = record
            .decode_payload::<WebhookPayload>()
            .context("decode webhook payload")?
        else {
            tracing::warn!(id = record.id, "webhook outbox without payload dropped");
            return Ok(());
        };
        let method =
            Method::from_bytes(webhook.method.as_bytes()).context("decode webhook method")?;
        let mut headers = HeaderMap::new();
        for header in &webhook.headers {
            match (
                HeaderName::from_bytes(header.name.as_bytes()),
                HeaderValue::from_bytes(&header.value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(header = %header.name, "skipping unreplayable webhook header"),
            }
        }
        client
            .request(method, &webhook.path, headers, Bytes::from(webhook.body), prefix)
            .await?;
        Ok(())
    }
}

impl<C: RequestAttemptCache> OutboxDelivery for RegionDelivery<C> {
    async fn deliver(&self, record: &OutboxRecord) -> Result<(), DeliveryError> {
        let region = record
            .region_name
            .as_deref()
            .context("control outbox without region")?;
        let client = self
            .clients
            .get(region)
            .ok_or_else(|| anyhow!("region {region} is not registered"))?;
        let prefix = record.coalescing_key().to_string();

        match record.category {
            OutboxCategory::WebhookProxy => self.replay_webhook(client, record, &prefix).await,
            _ => client
                .post_json(OUTBOX_RECEIVER_PATH, &record.envelope(), &prefix)
                .await
                .map(|_| ())
                .map_err(DeliveryError::from),
        }
    }
}
