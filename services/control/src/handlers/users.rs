use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use silo_domain::id::UserId;

use crate::error::ControlServiceError;
use crate::state::AppState;
use crate::usecase::user::{UpdateUserInput, UpdateUserUseCase};

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(serialize_with = "silo_core::serde::to_rfc3339_ms")]
    pub date_updated: chrono::DateTime<chrono::Utc>,
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ControlServiceError> {
    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
        resolver: state.region_resolver(),
    };
    let user = usecase
        .execute(UpdateUserInput {
            user_id: UserId(user_id),
            email: body.email,
            name: body.name,
        })
        .await?;
    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        date_updated: user.date_updated,
    }))
}
