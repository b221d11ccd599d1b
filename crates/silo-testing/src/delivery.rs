use std::collections::VecDeque;
use std::sync::Mutex;

use silo_outbox::{DeliveryError, OutboxDelivery, OutboxRecord};

/// Delivery that records every representative it is handed.
///
/// Queued failures are returned first, one per call, before deliveries
/// start succeeding.
#[derive(Default)]
pub struct RecordingDelivery {
    delivered: Mutex<Vec<OutboxRecord>>,
    failures: Mutex<VecDeque<DeliveryError>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: DeliveryError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn delivered(&self) -> Vec<OutboxRecord> {
        self.delivered.lock().unwrap().clone()
    }
}

impl OutboxDelivery for RecordingDelivery {
    async fn deliver(&self, record: &OutboxRecord) -> Result<(), DeliveryError> {
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.delivered.lock().unwrap().push(record.clone());
        Ok(())
    }
}
