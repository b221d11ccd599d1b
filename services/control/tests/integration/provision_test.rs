use chrono::Utc;
use futures::future::join_all;

use silo_control::domain::types::SlugReservation;
use silo_control::error::ControlServiceError;
use silo_control::usecase::provision::{IdempotentProvisionUseCase, ProvisionOrganizationInput};
use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::{ProvisionOrganizationPayload, SlugReservationType};
use silo_outbox::DrainSignal;

use crate::helpers::{
    FixedResolver, MockSlugReservationRepo, MockUserRepo, registry, test_user,
};

fn usecase(
    reservations: MockSlugReservationRepo,
) -> IdempotentProvisionUseCase<MockUserRepo, MockSlugReservationRepo, FixedResolver> {
    IdempotentProvisionUseCase {
        users: MockUserRepo::new(vec![test_user()]),
        reservations,
        resolver: FixedResolver::default(),
        regions: registry(),
        drain: DrainSignal::new(),
    }
}

fn input(slug: &str, require_exact_slug: bool) -> ProvisionOrganizationInput {
    ProvisionOrganizationInput {
        owner_user_id: test_user().id,
        slug: slug.to_owned(),
        name: "Acme".to_owned(),
        region_name: "us".to_owned(),
        require_exact_slug,
    }
}

fn foreign_reservation(slug: &str) -> SlugReservation {
    SlugReservation {
        id: SlugReservationId(1),
        slug: slug.to_owned(),
        requested_slug: slug.to_owned(),
        organization_id: OrganizationId(500),
        user_id: UserId(9999),
        region_name: "de".to_owned(),
        reservation_type: SlugReservationType::Primary,
        date_added: Utc::now(),
    }
}

#[tokio::test]
async fn should_reserve_slug_and_emit_provision_outboxes() {
    let repo = MockSlugReservationRepo::empty();
    let outboxes = repo.outboxes_handle();
    let uc = usecase(repo);

    let provisioned = uc.execute(input("acme", true)).await.unwrap();

    assert_eq!(provisioned.slug, "acme");
    let outboxes = outboxes.lock().unwrap();
    let mut categories: Vec<_> = outboxes.iter().map(|o| o.category()).collect();
    categories.sort_by_key(|c| c.as_i32());
    assert_eq!(
        categories,
        vec![
            OutboxCategory::OrganizationSlugReservationUpdate,
            OutboxCategory::ProvisionOrganization,
        ]
    );
    assert!(outboxes.iter().all(|o| o.region_name() == Some("us")));

    let provision = outboxes
        .iter()
        .find(|o| o.category() == OutboxCategory::ProvisionOrganization)
        .unwrap();
    let payload: ProvisionOrganizationPayload =
        serde_json::from_value(provision.payload().cloned().unwrap()).unwrap();
    assert_eq!(payload.organization_id, provisioned.organization_id);
    assert_eq!(payload.owner_user_id, test_user().id);
}

#[tokio::test]
async fn should_return_same_result_when_called_twice() {
    let repo = MockSlugReservationRepo::empty();
    let reservations = repo.reservations_handle();
    let outboxes = repo.outboxes_handle();
    let uc = usecase(repo);

    let first = uc.execute(input("acme", true)).await.unwrap();
    let second = uc.execute(input("acme", true)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(reservations.lock().unwrap().len(), 1);
    assert_eq!(
        outboxes.lock().unwrap().len(),
        2,
        "a repeated call must not emit more outboxes"
    );
}

#[tokio::test]
async fn should_create_exactly_one_organization_under_concurrent_calls() {
    let repo = MockSlugReservationRepo::empty();
    let reservations = repo.reservations_handle();
    let uc = usecase(repo);

    let results = join_all((0..8).map(|_| uc.execute(input("acme", true)))).await;

    let results: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    assert!(
        results.iter().all(|r| r == &results[0]),
        "all calls must resolve to the same organization: {results:?}"
    );
    let reservations = reservations.lock().unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].organization_id, results[0].organization_id);
}

#[tokio::test]
async fn should_not_provision_when_exact_slug_is_owned_by_someone_else() {
    let existing = foreign_reservation("acme");
    let repo = MockSlugReservationRepo::new(vec![existing.clone()]);
    let reservations = repo.reservations_handle();
    let outboxes = repo.outboxes_handle();
    let uc = usecase(repo);

    let result = uc.execute(input("acme", true)).await;

    assert!(
        matches!(result, Err(ControlServiceError::NotProvisioned)),
        "expected NotProvisioned, got {result:?}"
    );
    assert_eq!(*reservations.lock().unwrap(), vec![existing]);
    assert!(outboxes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_fall_back_to_alternate_slug_on_collision() {
    let repo = MockSlugReservationRepo::new(vec![foreign_reservation("acme")]);
    let reservations = repo.reservations_handle();
    let uc = usecase(repo);

    let provisioned = uc.execute(input("acme", false)).await.unwrap();

    assert_ne!(provisioned.slug, "acme");
    assert!(provisioned.slug.starts_with("acme-"));
    let reservations = reservations.lock().unwrap();
    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0].user_id, UserId(9999), "existing owner untouched");
}

#[tokio::test]
async fn should_return_same_alternate_slug_when_called_twice() {
    let repo = MockSlugReservationRepo::new(vec![foreign_reservation("acme")]);
    let reservations = repo.reservations_handle();
    let outboxes = repo.outboxes_handle();
    let uc = usecase(repo);

    let first = uc.execute(input("acme", false)).await.unwrap();
    let second = uc.execute(input("acme", false)).await.unwrap();

    assert_eq!(first, second);
    assert!(first.slug.starts_with("acme-"));
    let reservations = reservations.lock().unwrap();
    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[1].requested_slug, "acme");
    assert_eq!(outboxes.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn should_hand_out_one_alternate_slug_under_concurrent_calls() {
    let repo = MockSlugReservationRepo::new(vec![foreign_reservation("acme")]);
    let reservations = repo.reservations_handle();
    let uc = usecase(repo);

    let results = join_all((0..8).map(|_| uc.execute(input("acme", false)))).await;

    let results: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    assert!(
        results.iter().all(|r| r == &results[0]),
        "all calls must resolve to the same organization: {results:?}"
    );
    assert_eq!(reservations.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn should_reserve_separately_for_another_region() {
    let repo = MockSlugReservationRepo::new(vec![foreign_reservation("acme")]);
    let reservations = repo.reservations_handle();
    let uc = usecase(repo);

    let us = uc.execute(input("acme", false)).await.unwrap();
    let mut request = input("acme", false);
    request.region_name = "de".to_owned();
    let de = uc.execute(request).await.unwrap();

    assert_ne!(us.organization_id, de.organization_id);
    assert_eq!(reservations.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn should_reject_invalid_slug() {
    let uc = usecase(MockSlugReservationRepo::empty());

    let result = uc.execute(input("Not A Slug", false)).await;

    assert!(matches!(result, Err(ControlServiceError::InvalidSlug)));
}

#[tokio::test]
async fn should_reject_unknown_region() {
    let uc = usecase(MockSlugReservationRepo::empty());
    let mut request = input("acme", false);
    request.region_name = "mars".to_owned();

    let result = uc.execute(request).await;

    assert!(matches!(result, Err(ControlServiceError::UnknownRegion)));
}

#[tokio::test]
async fn should_reject_unknown_owner() {
    let uc = IdempotentProvisionUseCase {
        users: MockUserRepo::empty(),
        reservations: MockSlugReservationRepo::empty(),
        resolver: FixedResolver::default(),
        regions: registry(),
        drain: DrainSignal::new(),
    };

    let result = uc.execute(input("acme", false)).await;

    assert!(matches!(result, Err(ControlServiceError::UserNotFound)));
}
