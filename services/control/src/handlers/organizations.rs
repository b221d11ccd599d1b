use axum::{
    Json,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use silo_domain::id::UserId;
use silo_rpc::proxy_request;

use crate::domain::repository::MappingRepository;
use crate::domain::types::ProvisionedOrganization;
use crate::error::ControlServiceError;
use crate::state::AppState;
use crate::usecase::provision::{IdempotentProvisionUseCase, ProvisionOrganizationInput};

#[derive(Deserialize)]
pub struct ProvisionOrganizationRequest {
    pub owner_user_id: UserId,
    pub slug: String,
    pub name: String,
    pub region_name: String,
    #[serde(default)]
    pub require_exact_slug: bool,
}

pub async fn provision_organization(
    State(state): State<AppState>,
    Json(body): Json<ProvisionOrganizationRequest>,
) -> Result<(StatusCode, Json<ProvisionedOrganization>), ControlServiceError> {
    let usecase = IdempotentProvisionUseCase {
        users: state.user_repo(),
        reservations: state.slug_reservation_repo(),
        resolver: state.region_resolver(),
        regions: state.regions.clone(),
        drain: state.drain_signal.clone(),
    };
    let provisioned = usecase
        .execute(ProvisionOrganizationInput {
            owner_user_id: body.owner_user_id,
            slug: body.slug,
            name: body.name,
            region_name: body.region_name,
            require_exact_slug: body.require_exact_slug,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(provisioned)))
}

/// Relay any organization-scoped API call to the organization's region.
pub async fn proxy_to_region(
    State(state): State<AppState>,
    Path((slug, _rest)): Path<(String, String)>,
    request: Request,
) -> Result<Response, ControlServiceError> {
    let organization = state
        .mapping_repo()
        .find_organization_by_slug(&slug)
        .await?
        .ok_or(ControlServiceError::OrganizationNotFound)?;
    let client = state
        .region_clients
        .get(&organization.region_name)
        .ok_or(ControlServiceError::UnknownRegion)?;
    Ok(proxy_request(client, request).await.into_response())
}
