use axum::{
    Json,
    extract::{Path, State},
};

use crate::domain::types::SlugReservationReplica;
use crate::error::RegionServiceError;
use crate::state::AppState;
use crate::usecase::slug::GetSlugReservationUseCase;

pub async fn get_slug_reservation(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<SlugReservationReplica>, RegionServiceError> {
    let usecase = GetSlugReservationUseCase {
        replicas: state.replica_repo(),
    };
    Ok(Json(usecase.execute(&slug).await?))
}
