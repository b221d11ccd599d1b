use serde_json::json;

use silo_control::domain::types::OWNER_ROLE;
use silo_control::error::ControlServiceError;
use silo_control::usecase::apply::ApplyRegionOutboxUseCase;
use silo_domain::id::{OrganizationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_outbox::OutboxEnvelope;

use crate::helpers::MockMappingRepo;

fn envelope(
    category: OutboxCategory,
    shard: i64,
    object: i64,
    payload: Option<serde_json::Value>,
) -> OutboxEnvelope {
    OutboxEnvelope {
        category: category.as_i32(),
        scope: category.scope().as_i32(),
        shard_identifier: shard,
        object_identifier: object,
        region_name: None,
        payload,
    }
}

fn post_provision() -> OutboxEnvelope {
    envelope(
        OutboxCategory::PostOrganizationProvision,
        70,
        70,
        Some(json!({
            "organization_id": 70,
            "slug": "acme",
            "name": "Acme",
            "owner_user_id": 1001,
            "region_name": "de",
        })),
    )
}

#[tokio::test]
async fn should_map_provisioned_organization_and_owner() {
    let repo = MockMappingRepo::default();
    let organizations = repo.organizations_handle();
    let members = repo.members_handle();
    let uc = ApplyRegionOutboxUseCase { mappings: repo };

    uc.execute(&post_provision()).await.unwrap();
    // Redelivery is a no-op.
    uc.execute(&post_provision()).await.unwrap();

    let organizations = organizations.lock().unwrap();
    assert_eq!(organizations.len(), 1);
    let mapping = &organizations[&OrganizationId(70)];
    assert_eq!(mapping.slug, "acme");
    assert_eq!(mapping.region_name, "de");
    let members = members.lock().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[&(OrganizationId(70), UserId(1001))].role, OWNER_ROLE);
}

#[tokio::test]
async fn should_upsert_then_delete_organization_mapping() {
    let repo = MockMappingRepo::default();
    let organizations = repo.organizations_handle();
    let uc = ApplyRegionOutboxUseCase { mappings: repo };

    uc.execute(&envelope(
        OutboxCategory::OrganizationUpdate,
        70,
        70,
        Some(json!({
            "organization_id": 70,
            "slug": "acme-renamed",
            "name": "Acme",
            "region_name": "de",
        })),
    ))
    .await
    .unwrap();
    assert_eq!(
        organizations.lock().unwrap()[&OrganizationId(70)].slug,
        "acme-renamed"
    );

    uc.execute(&envelope(OutboxCategory::OrganizationUpdate, 70, 70, None))
        .await
        .unwrap();
    assert!(organizations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_remove_member_mapping_on_null_payload() {
    let repo = MockMappingRepo::default();
    let members = repo.members_handle();
    let uc = ApplyRegionOutboxUseCase { mappings: repo };

    uc.execute(&envelope(
        OutboxCategory::OrganizationMemberUpdate,
        70,
        1001,
        Some(json!({ "organization_id": 70, "user_id": 1001, "role": "member" })),
    ))
    .await
    .unwrap();
    assert_eq!(members.lock().unwrap().len(), 1);

    uc.execute(&envelope(
        OutboxCategory::OrganizationMemberUpdate,
        70,
        1001,
        None,
    ))
    .await
    .unwrap();
    assert!(members.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_control_to_region_category() {
    let uc = ApplyRegionOutboxUseCase {
        mappings: MockMappingRepo::default(),
    };

    let result = uc
        .execute(&envelope(OutboxCategory::UserUpdate, 1, 1, None))
        .await;

    assert!(
        matches!(result, Err(ControlServiceError::InvalidEnvelope(_))),
        "expected InvalidEnvelope, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_category_code() {
    let uc = ApplyRegionOutboxUseCase {
        mappings: MockMappingRepo::default(),
    };
    let mut unknown = post_provision();
    unknown.category = 99;

    let result = uc.execute(&unknown).await;

    assert!(matches!(result, Err(ControlServiceError::InvalidEnvelope(_))));
}
