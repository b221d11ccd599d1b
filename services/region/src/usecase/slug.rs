use crate::domain::repository::ReplicaRepository;
use crate::domain::types::SlugReservationReplica;
use crate::error::RegionServiceError;

pub struct GetSlugReservationUseCase<R>
where
    R: ReplicaRepository,
{
    pub replicas: R,
}

impl<R> GetSlugReservationUseCase<R>
where
    R: ReplicaRepository,
{
    pub async fn execute(&self, slug: &str) -> Result<SlugReservationReplica, RegionServiceError> {
        self.replicas
            .find_slug_reservation(slug)
            .await?
            .ok_or(RegionServiceError::SlugReservationNotFound)
    }
}
