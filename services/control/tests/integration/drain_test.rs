use chrono::{Duration, Utc};

use silo_control::usecase::user::{UpdateUserInput, UpdateUserUseCase};
use silo_domain::payload::UserUpdatePayload;
use silo_outbox::{DeliveryError, OutboxDrainer};
use silo_testing::delivery::RecordingDelivery;
use silo_testing::store::MemoryOutboxStore;

use crate::helpers::{FixedResolver, MockUserRepo, test_user};

/// Apply three renames and queue every record they produced.
async fn queue_renames(store: &MemoryOutboxStore) {
    let user = test_user();
    let repo = MockUserRepo::new(vec![user.clone()]);
    let outboxes = repo.outboxes_handle();
    let uc = UpdateUserUseCase {
        users: repo,
        resolver: FixedResolver::with_user(user.id, &["us", "de"]),
    };
    for name in ["First", "Second", "Third"] {
        uc.execute(UpdateUserInput {
            user_id: user.id,
            email: None,
            name: Some(name.to_owned()),
        })
        .await
        .unwrap();
    }
    store.extend(outboxes.lock().unwrap().drain(..), Utc::now());
}

#[tokio::test]
async fn should_deliver_latest_user_state_once_per_region() {
    let store = MemoryOutboxStore::new();
    queue_renames(&store).await;
    assert_eq!(store.len(), 6);
    let drainer = OutboxDrainer::new(store, RecordingDelivery::new());

    let report = drainer.drain_once().await.unwrap();

    assert_eq!(report.delivered, 2);
    assert!(drainer.store().is_empty());
    let delivered = drainer.delivery().delivered();
    let mut regions: Vec<_> = delivered
        .iter()
        .filter_map(|r| r.region_name.clone())
        .collect();
    regions.sort();
    assert_eq!(regions, vec!["de", "us"]);
    for record in &delivered {
        let payload: UserUpdatePayload = record.decode_payload().unwrap().unwrap();
        assert_eq!(payload.name, "Third");
    }
}

#[tokio::test]
async fn should_retry_failed_region_after_backoff() {
    let store = MemoryOutboxStore::new();
    queue_renames(&store).await;
    let delivery = RecordingDelivery::new();
    delivery.fail_next(DeliveryError::Transient(anyhow::anyhow!("region down")));
    let drainer = OutboxDrainer::new(store, delivery);
    let now = Utc::now();

    let first = drainer.drain_at(now).await.unwrap();
    assert_eq!((first.delivered, first.failed), (1, 1));
    assert_eq!(drainer.store().len(), 3);
    assert!(drainer.store().rows().iter().all(|r| r.attempts == 1));

    let immediate = drainer.drain_at(now).await.unwrap();
    assert_eq!(immediate.listed, 0);

    let later = drainer.drain_at(now + Duration::hours(2)).await.unwrap();
    assert_eq!(later.delivered, 1);
    assert!(drainer.store().is_empty());
    assert_eq!(drainer.delivery().delivered().len(), 2);
}
