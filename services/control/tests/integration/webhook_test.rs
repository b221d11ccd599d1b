use chrono::Utc;

use silo_control::domain::types::OrganizationMapping;
use silo_control::error::ControlServiceError;
use silo_control::usecase::webhook::{EnqueueWebhookInput, EnqueueWebhookUseCase};
use silo_domain::id::OrganizationId;
use silo_domain::outbox::{OutboxCategory, OutboxScope};
use silo_domain::payload::{WebhookHeader, WebhookPayload};
use silo_outbox::DrainSignal;

use crate::helpers::{FixedResolver, MockMappingRepo, MockOutboxWriter};

fn acme() -> OrganizationMapping {
    OrganizationMapping {
        organization_id: OrganizationId(70),
        slug: "acme".to_owned(),
        name: "Acme".to_owned(),
        region_name: "de".to_owned(),
        date_updated: Utc::now(),
    }
}

fn push_event() -> WebhookPayload {
    WebhookPayload {
        method: "POST".to_owned(),
        path: "/extensions/github/webhook/acme".to_owned(),
        headers: vec![WebhookHeader::new("x-github-event", "push")],
        body: b"{}".to_vec(),
    }
}

#[tokio::test]
async fn should_queue_each_webhook_for_the_organization_region() {
    let writer = MockOutboxWriter::default();
    let outboxes = writer.outboxes_handle();
    let uc = EnqueueWebhookUseCase {
        mappings: MockMappingRepo::with_organization(acme()),
        outboxes: writer,
        resolver: FixedResolver::default(),
        drain: DrainSignal::new(),
    };

    let first = uc
        .execute(EnqueueWebhookInput {
            organization_slug: "acme".to_owned(),
            request: push_event(),
        })
        .await
        .unwrap();
    let second = uc
        .execute(EnqueueWebhookInput {
            organization_slug: "acme".to_owned(),
            request: push_event(),
        })
        .await
        .unwrap();

    assert_ne!(first, second);
    let outboxes = outboxes.lock().unwrap();
    assert_eq!(outboxes.len(), 2);
    assert_ne!(
        outboxes[0].coalescing_key(),
        outboxes[1].coalescing_key(),
        "webhooks must never coalesce"
    );
    for outbox in outboxes.iter() {
        assert_eq!(outbox.category(), OutboxCategory::WebhookProxy);
        assert_eq!(outbox.scope(), OutboxScope::Webhook);
        assert_eq!(outbox.region_name(), Some("de"));
    }
}

#[tokio::test]
async fn should_return_not_found_for_unknown_organization() {
    let uc = EnqueueWebhookUseCase {
        mappings: MockMappingRepo::default(),
        outboxes: MockOutboxWriter::default(),
        resolver: FixedResolver::default(),
        drain: DrainSignal::new(),
    };

    let result = uc
        .execute(EnqueueWebhookInput {
            organization_slug: "ghost".to_owned(),
            request: push_event(),
        })
        .await;

    assert!(
        matches!(result, Err(ControlServiceError::OrganizationNotFound)),
        "expected OrganizationNotFound, got {result:?}"
    );
}
