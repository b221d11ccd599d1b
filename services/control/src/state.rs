use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use silo_core::health::Readiness;
use silo_domain::region::RegionRegistry;
use silo_outbox::DrainSignal;
use silo_rpc::{RedisAttemptCache, RegionAddressValidator, RpcSecret, SiloClient};

use crate::infra::db::{
    DbMappingRepository, DbOutboxWriter, DbSlugReservationRepository, DbUserRepository,
};
use crate::infra::resolver::DbRegionResolver;

pub type RegionClients = Arc<BTreeMap<String, SiloClient<RedisAttemptCache>>>;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub regions: Arc<RegionRegistry>,
    pub region_clients: RegionClients,
    pub region_validator: Arc<RegionAddressValidator>,
    pub rpc_secret: RpcSecret,
    pub readiness: Readiness,
    pub drain_signal: DrainSignal,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn mapping_repo(&self) -> DbMappingRepository {
        DbMappingRepository {
            db: self.db.clone(),
        }
    }

    pub fn slug_reservation_repo(&self) -> DbSlugReservationRepository {
        DbSlugReservationRepository {
            db: self.db.clone(),
        }
    }

    pub fn outbox_writer(&self) -> DbOutboxWriter {
        DbOutboxWriter {
            db: self.db.clone(),
        }
    }

    pub fn region_resolver(&self) -> DbRegionResolver {
        DbRegionResolver {
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
