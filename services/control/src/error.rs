use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use silo_outbox::OutboxError;

/// Control service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ControlServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("organization not found")]
    OrganizationNotFound,
    #[error("slug reservation not found")]
    SlugReservationNotFound,
    /// The slug belongs to someone else and an exact slug was required.
    #[error("organization not provisioned")]
    NotProvisioned,
    #[error("invalid slug")]
    InvalidSlug,
    #[error("unknown region")]
    UnknownRegion,
    #[error("invalid outbox envelope: {0}")]
    InvalidEnvelope(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ControlServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::OrganizationNotFound => "ORGANIZATION_NOT_FOUND",
            Self::SlugReservationNotFound => "SLUG_RESERVATION_NOT_FOUND",
            Self::NotProvisioned => "NOT_PROVISIONED",
            Self::InvalidSlug => "INVALID_SLUG",
            Self::UnknownRegion => "UNKNOWN_REGION",
            Self::InvalidEnvelope(_) => "INVALID_ENVELOPE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<OutboxError> for ControlServiceError {
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

impl IntoResponse for ControlServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::OrganizationNotFound | Self::SlugReservationNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::NotProvisioned => StatusCode::CONFLICT,
            Self::InvalidSlug | Self::UnknownRegion | Self::InvalidEnvelope(_) => {
                StatusCode::BAD_REQUEST
            }
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
