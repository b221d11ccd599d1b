use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use silo_core::health::Readiness;
use silo_outbox::DrainSignal;
use silo_rpc::RpcSecret;

use crate::infra::db::{DbMemberRepository, DbOrganizationRepository, DbReplicaRepository};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub region_name: String,
    pub rpc_secret: RpcSecret,
    pub readiness: Readiness,
    pub drain_signal: DrainSignal,
}

impl AppState {
    pub fn organization_repo(&self) -> DbOrganizationRepository {
        DbOrganizationRepository {
            db: self.db.clone(),
        }
    }

    pub fn member_repo(&self) -> DbMemberRepository {
        DbMemberRepository {
            db: self.db.clone(),
        }
    }

    pub fn replica_repo(&self) -> DbReplicaRepository {
        DbReplicaRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for RpcSecret {
    fn from_ref(state: &AppState) -> Self {
        state.rpc_secret.clone()
    }
}

impl FromRef<AppState> for Readiness {
    fn from_ref(state: &AppState) -> Self {
        state.readiness.clone()
    }
}
