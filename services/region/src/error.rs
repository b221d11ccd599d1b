use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use silo_outbox::OutboxError;

/// Region service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum RegionServiceError {
    #[error("organization not found")]
    OrganizationNotFound,
    #[error("member not found")]
    MemberNotFound,
    #[error("slug reservation not found")]
    SlugReservationNotFound,
    #[error("invalid outbox envelope: {0}")]
    InvalidEnvelope(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl RegionServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrganizationNotFound => "ORGANIZATION_NOT_FOUND",
            Self::MemberNotFound => "MEMBER_NOT_FOUND",
            Self::SlugReservationNotFound => "SLUG_RESERVATION_NOT_FOUND",
            Self::InvalidEnvelope(_) => "INVALID_ENVELOPE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<OutboxError> for RegionServiceError {
    fn from(e: OutboxError) -> Self {
        match e {
            OutboxError::UnknownCategory(_)
            | OutboxError::UnknownScope(_)
            | OutboxError::ScopeMismatch { .. }
            | OutboxError::Payload { .. } => Self::InvalidEnvelope(e.to_string()),
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for RegionServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::OrganizationNotFound | Self::MemberNotFound | Self::SlugReservationNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::InvalidEnvelope(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
