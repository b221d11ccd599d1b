use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::error::ControlServiceError;
use crate::state::AppState;
use crate::usecase::slug::ReleaseSlugUseCase;

pub async fn release_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<StatusCode, ControlServiceError> {
    let usecase = ReleaseSlugUseCase {
        reservations: state.slug_reservation_repo(),
        resolver: state.region_resolver(),
    };
    usecase.execute(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
