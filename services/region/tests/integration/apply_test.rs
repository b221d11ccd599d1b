use serde_json::json;

use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::{PostProvisionPayload, SlugReservationType};
use silo_outbox::{NewOutbox, OutboxEnvelope};
use silo_region::domain::types::OWNER_ROLE;
use silo_region::error::RegionServiceError;

use crate::helpers::{MockOrganizationRepo, MockReplicaRepo, REGION, apply_usecase, envelope};

fn provision(region: &str) -> OutboxEnvelope {
    envelope(
        &NewOutbox::control(
            region,
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
        .unwrap(),
    )
}

fn slug_update(payload: Option<serde_json::Value>) -> OutboxEnvelope {
    envelope(
        &NewOutbox::control(
            REGION,
            OutboxCategory::OrganizationSlugReservationUpdate,
            70,
            3,
            payload,
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn should_provision_organization_with_owner_and_confirm() {
    let organizations = MockOrganizationRepo::new();
    let replicas = MockReplicaRepo::new();

    apply_usecase(&organizations, &replicas)
        .execute(&provision(REGION))
        .await
        .unwrap();

    let created = organizations.organizations.lock().unwrap()[&OrganizationId(70)].clone();
    assert_eq!(created.slug, "acme");
    let owner = organizations.members.lock().unwrap()[&(OrganizationId(70), UserId(1001))].clone();
    assert_eq!(owner.role, OWNER_ROLE);

    let outboxes = organizations.outboxes();
    assert_eq!(outboxes.len(), 1);
    assert_eq!(
        outboxes[0].category(),
        OutboxCategory::PostOrganizationProvision
    );
    let confirmed: PostProvisionPayload =
        serde_json::from_value(outboxes[0].payload().unwrap().clone()).unwrap();
    assert_eq!(confirmed.region_name, REGION);
    assert_eq!(confirmed.owner_user_id, UserId(1001));
}

#[tokio::test]
async fn should_ignore_replayed_provision() {
    let organizations = MockOrganizationRepo::new();
    let replicas = MockReplicaRepo::new();

    for _ in 0..3 {
        apply_usecase(&organizations, &replicas)
            .execute(&provision(REGION))
            .await
            .unwrap();
    }

    assert_eq!(organizations.organizations.lock().unwrap().len(), 1);
    assert_eq!(organizations.members.lock().unwrap().len(), 1);
    assert_eq!(organizations.outboxes().len(), 1);
}

#[tokio::test]
async fn should_reject_message_for_another_region() {
    let organizations = MockOrganizationRepo::new();
    let replicas = MockReplicaRepo::new();

    let err = apply_usecase(&organizations, &replicas)
        .execute(&provision("de"))
        .await
        .unwrap_err();

    assert!(matches!(err, RegionServiceError::InvalidEnvelope(_)));
    assert!(organizations.organizations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_upsert_then_delete_user_replica() {
    let organizations = MockOrganizationRepo::new();
    let replicas = MockReplicaRepo::new();
    let update = |payload| {
        envelope(
            &NewOutbox::control(REGION, OutboxCategory::UserUpdate, 1001, 1001, payload).unwrap(),
        )
    };

    apply_usecase(&organizations, &replicas)
        .execute(&update(Some(json!({
            "user_id": 1001,
            "email": "owner@example.com",
            "name": "Owner",
        }))))
        .await
        .unwrap();
    assert_eq!(
        replicas.user(UserId(1001)).unwrap().email,
        "owner@example.com"
    );

    apply_usecase(&organizations, &replicas)
        .execute(&update(None))
        .await
        .unwrap();
    assert!(replicas.user(UserId(1001)).is_none());
}

#[tokio::test]
async fn should_upsert_then_delete_slug_replica() {
    let organizations = MockOrganizationRepo::new();
    let replicas = MockReplicaRepo::new();

    apply_usecase(&organizations, &replicas)
        .execute(&slug_update(Some(json!({
            "reservation_id": 3,
            "slug": "acme",
            "organization_id": 70,
            "user_id": 1001,
            "region_name": REGION,
            "reservation_type": "temporary_renaming",
        }))))
        .await
        .unwrap();
    let replica = replicas.reservation(SlugReservationId(3)).unwrap();
    assert_eq!(replica.reservation_type, SlugReservationType::TemporaryRenaming);

    apply_usecase(&organizations, &replicas)
        .execute(&slug_update(None))
        .await
        .unwrap();
    assert!(replicas.reservation(SlugReservationId(3)).is_none());
}

#[tokio::test]
async fn should_reject_region_to_control_category() {
    let organizations = MockOrganizationRepo::new();
    let replicas = MockReplicaRepo::new();
    let misdirected = OutboxEnvelope {
        category: OutboxCategory::OrganizationUpdate.as_i32(),
        scope: OutboxCategory::OrganizationUpdate.scope().as_i32(),
        shard_identifier: 70,
        object_identifier: 70,
        region_name: None,
        payload: None,
    };

    let err = apply_usecase(&organizations, &replicas)
        .execute(&misdirected)
        .await
        .unwrap_err();

    assert!(matches!(err, RegionServiceError::InvalidEnvelope(_)));
}

#[tokio::test]
async fn should_reject_provision_without_payload() {
    let organizations = MockOrganizationRepo::new();
    let replicas = MockReplicaRepo::new();
    let empty = envelope(
        &NewOutbox::control(REGION, OutboxCategory::ProvisionOrganization, 70, 70, None).unwrap(),
    );

    let err = apply_usecase(&organizations, &replicas)
        .execute(&empty)
        .await
        .unwrap_err();

    assert!(matches!(err, RegionServiceError::InvalidEnvelope(_)));
    assert!(organizations.outboxes().is_empty());
}
