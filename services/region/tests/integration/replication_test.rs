use chrono::{Duration, Utc};
use serde_json::json;

use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::SlugReservationType;
use silo_outbox::{NewOutbox, OutboxDrainer};
use silo_testing::store::MemoryOutboxStore;

use crate::helpers::{ApplyingDelivery, REGION};

fn reservation_version(user_id: i64, region: &str, reservation_type: &str) -> NewOutbox {
    NewOutbox::control(
        REGION,
        OutboxCategory::OrganizationSlugReservationUpdate,
        70,
        3,
        Some(json!({
            "reservation_id": 3,
            "slug": "acme",
            "organization_id": 70,
            "user_id": user_id,
            "region_name": region,
            "reservation_type": reservation_type,
        })),
    )
    .unwrap()
}

#[tokio::test]
async fn should_converge_slug_replica_to_latest_origin_state() {
    let store = MemoryOutboxStore::new();
    let now = Utc::now();
    store.extend(
        [
            reservation_version(1001, REGION, "primary"),
            reservation_version(1001, REGION, "temporary_renaming"),
            reservation_version(2002, REGION, "primary"),
        ],
        now,
    );
    let drainer = OutboxDrainer::new(store, ApplyingDelivery::default());

    let report = drainer.drain_at(now).await.unwrap();

    assert_eq!(report.delivered, 1);
    assert!(drainer.store().is_empty());
    assert_eq!(drainer.delivery().delivered().len(), 1);
    let replica = drainer
        .delivery()
        .replicas
        .reservation(SlugReservationId(3))
        .unwrap();
    assert_eq!(
        (
            replica.slug.as_str(),
            replica.organization_id,
            replica.user_id,
            replica.region_name.as_str(),
            replica.reservation_type,
        ),
        (
            "acme",
            OrganizationId(70),
            UserId(2002),
            REGION,
            SlugReservationType::Primary,
        )
    );
}

#[tokio::test]
async fn should_drop_replica_when_release_is_latest() {
    let store = MemoryOutboxStore::new();
    let now = Utc::now();
    store.push(reservation_version(1001, REGION, "primary"), now);
    let drainer = OutboxDrainer::new(store, ApplyingDelivery::default());
    drainer.drain_at(now).await.unwrap();
    assert!(
        drainer
            .delivery()
            .replicas
            .reservation(SlugReservationId(3))
            .is_some()
    );

    let later = now + Duration::seconds(1);
    drainer.store().extend(
        [
            reservation_version(1001, REGION, "temporary_renaming"),
            NewOutbox::control(
                REGION,
                OutboxCategory::OrganizationSlugReservationUpdate,
                70,
                3,
                None,
            )
            .unwrap(),
        ],
        later,
    );
    drainer.drain_at(later).await.unwrap();

    assert!(
        drainer
            .delivery()
            .replicas
            .reservation(SlugReservationId(3))
            .is_none()
    );
    assert_eq!(drainer.delivery().delivered().len(), 2);
}

#[tokio::test]
async fn should_deliver_once_per_key_and_provision_once() {
    let store = MemoryOutboxStore::new();
    let now = Utc::now();
    let provision = NewOutbox::control(
        REGION,
        OutboxCategory::ProvisionOrganization,
        70,
        70,
        Some(json!({
            "organization_id": 70,
            "slug": "acme",
            "name": "Acme",
            "owner_user_id": 1001,
        })),
    )
    .unwrap();
    store.extend([provision.clone(), provision], now);
    store.push(reservation_version(1001, REGION, "primary"), now);
    let drainer = OutboxDrainer::new(store, ApplyingDelivery::default());

    let report = drainer.drain_at(now).await.unwrap();

    assert_eq!(report.listed, 2);
    assert_eq!(report.delivered, 2);
    assert_eq!(drainer.delivery().delivered().len(), 2);
    let organizations = &drainer.delivery().organizations;
    assert_eq!(organizations.organizations.lock().unwrap().len(), 1);
    assert_eq!(organizations.outboxes().len(), 1);
}
