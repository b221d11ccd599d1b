use chrono::Utc;

use silo_control::domain::types::SlugReservation;
use silo_control::error::ControlServiceError;
use silo_control::usecase::slug::ReleaseSlugUseCase;
use silo_domain::id::{OrganizationId, SlugReservationId, UserId};
use silo_domain::outbox::OutboxCategory;
use silo_domain::payload::SlugReservationType;

use crate::helpers::{FixedResolver, MockSlugReservationRepo};

fn reservation() -> SlugReservation {
    SlugReservation {
        id: SlugReservationId(7),
        slug: "acme".to_owned(),
        requested_slug: "acme".to_owned(),
        organization_id: OrganizationId(70),
        user_id: UserId(1001),
        region_name: "de".to_owned(),
        reservation_type: SlugReservationType::Primary,
        date_added: Utc::now(),
    }
}

#[tokio::test]
async fn should_release_slug_with_null_payload_for_owning_region() {
    let repo = MockSlugReservationRepo::new(vec![reservation()]);
    let reservations = repo.reservations_handle();
    let outboxes = repo.outboxes_handle();
    let uc = ReleaseSlugUseCase {
        reservations: repo,
        resolver: FixedResolver::default(),
    };

    let released = uc.execute("acme").await.unwrap();

    assert_eq!(released.id, SlugReservationId(7));
    assert!(reservations.lock().unwrap().is_empty());
    let outboxes = outboxes.lock().unwrap();
    assert_eq!(outboxes.len(), 1);
    let outbox = &outboxes[0];
    assert_eq!(
        outbox.category(),
        OutboxCategory::OrganizationSlugReservationUpdate
    );
    assert_eq!(outbox.region_name(), Some("de"));
    assert_eq!(outbox.object_identifier(), 7);
    assert!(outbox.payload().is_none(), "deletion replicates as null");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_slug() {
    let uc = ReleaseSlugUseCase {
        reservations: MockSlugReservationRepo::empty(),
        resolver: FixedResolver::default(),
    };

    let result = uc.execute("ghost").await;

    assert!(
        matches!(result, Err(ControlServiceError::SlugReservationNotFound)),
        "expected SlugReservationNotFound, got {result:?}"
    );
}
