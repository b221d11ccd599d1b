use silo_outbox::{DeliveryError, OutboxDelivery, OutboxRecord};
use silo_rpc::{OUTBOX_RECEIVER_PATH, RequestAttemptCache, SiloClient};

/// Posts region outbox records to control's outbox receiver.
pub struct ControlDelivery<C> {
    client: SiloClient<C>,
}

impl<C: RequestAttemptCache> ControlDelivery<C> {
    pub fn new(client: SiloClient<C>) -> Self {
        Self { client }
    }
}

impl<C: RequestAttemptCache> OutboxDelivery for ControlDelivery<C> {
    async fn deliver(&self, record: &OutboxRecord) -> Result<(), DeliveryError> {
        let prefix = record.coalescing_key().to_string();
        self.client
            .post_json(OUTBOX_RECEIVER_PATH, &record.envelope(), &prefix)
            .await?;
        Ok(())
    }
}
