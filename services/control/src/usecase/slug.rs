use silo_outbox::{OutboxProducer, RegionResolver};

use crate::domain::repository::SlugReservationRepository;
use crate::domain::types::{ReleasedSlugReservation, SlugReservation};
use crate::error::ControlServiceError;

/// Delete a slug reservation; the owning region drops its replica.
pub struct ReleaseSlugUseCase<S, R>
where
    S: SlugReservationRepository,
    R: RegionResolver,
{
    pub reservations: S,
    pub resolver: R,
}

impl<S, R> ReleaseSlugUseCase<S, R>
where
    S: SlugReservationRepository,
    R: RegionResolver,
{
    pub async fn execute(&self, slug: &str) -> Result<SlugReservation, ControlServiceError> {
        let reservation = self
            .reservations
            .find_by_slug(slug)
            .await?
            .ok_or(ControlServiceError::SlugReservationNotFound)?;

        let released = ReleasedSlugReservation(reservation);
        let outboxes = released.control_outboxes_for_update(&self.resolver).await?;
        if !self
            .reservations
            .delete_with_outbox(&released.0, &outboxes)
            .await?
        {
            return Err(ControlServiceError::SlugReservationNotFound);
        }
        Ok(released.0)
    }
}
