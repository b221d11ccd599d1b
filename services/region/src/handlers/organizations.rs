use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use silo_domain::id::UserId;

use crate::domain::types::{Member, Organization};
use crate::error::RegionServiceError;
use crate::state::AppState;
use crate::usecase::member::{RemoveMemberUseCase, UpsertMemberInput, UpsertMemberUseCase};
use crate::usecase::organization::{
    GetOrganizationUseCase, UpdateOrganizationInput, UpdateOrganizationUseCase,
};

pub async fn get_organization(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Organization>, RegionServiceError> {
    let usecase = GetOrganizationUseCase {
        organizations: state.organization_repo(),
    };
    Ok(Json(usecase.execute(&slug).await?))
}

#[derive(Deserialize)]
pub struct UpdateOrganizationRequest {
    pub name: Option<String>,
}

pub async fn update_organization(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, RegionServiceError> {
    let usecase = UpdateOrganizationUseCase {
        organizations: state.organization_repo(),
        region_name: state.region_name.clone(),
    };
    let organization = usecase
        .execute(UpdateOrganizationInput {
            slug,
            name: body.name,
        })
        .await?;
    Ok(Json(organization))
}

#[derive(Deserialize)]
pub struct UpsertMemberRequest {
    pub role: String,
}

pub async fn upsert_member(
    State(state): State<AppState>,
    Path((slug, user_id)): Path<(String, UserId)>,
    Json(body): Json<UpsertMemberRequest>,
) -> Result<Json<Member>, RegionServiceError> {
    let usecase = UpsertMemberUseCase {
        organizations: state.organization_repo(),
        members: state.member_repo(),
    };
    let member = usecase
        .execute(UpsertMemberInput {
            slug,
            user_id,
            role: body.role,
        })
        .await?;
    Ok(Json(member))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((slug, user_id)): Path<(String, UserId)>,
) -> Result<StatusCode, RegionServiceError> {
    let usecase = RemoveMemberUseCase {
        organizations: state.organization_repo(),
        members: state.member_repo(),
    };
    usecase.execute(&slug, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
