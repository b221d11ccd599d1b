use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use silo_control::config::ControlConfig;
use silo_control::infra::delivery::RegionDelivery;
use silo_control::router::build_router;
use silo_control::state::AppState;
use silo_core::health::Readiness;
use silo_core::tracing::init_tracing;
use silo_outbox::{DrainSignal, OutboxDrainer, OutboxTable, SeaOutboxStore};
use silo_rpc::{RedisAttemptCache, RegionAddressValidator, RpcSecret, SiloClient};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ControlConfig::from_env().expect("invalid control configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let attempts = RedisAttemptCache {
        pool: redis,
    };
    let region_clients = config
        .regions
        .iter()
        .map(|region| {
            SiloClient::region(
                config.mode,
                region,
                config.rpc_shared_secret.clone(),
                attempts.clone(),
                config.attempt_limit,
            )
            .and_then(|client| client.with_timeout(config.drain.delivery_deadline()))
            .map(|client| (region.name.clone(), client))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()
        .expect("failed to build region clients");
    let region_clients = Arc::new(region_clients);

    let drain_signal = DrainSignal::new();
    let drainer = OutboxDrainer::new(
        SeaOutboxStore::new(db.clone(), OutboxTable::Control),
        RegionDelivery::new(region_clients.clone()),
    )
    .with_config(config.drain);
    let drainer_signal = drain_signal.clone();
    tokio::spawn(async move {
        drainer.run(drainer_signal, shutdown_signal()).await;
    });

    let readiness = Readiness::default();
    let state = AppState {
        db,
        region_validator: Arc::new(RegionAddressValidator::from_registry(&config.regions)),
        regions: Arc::new(config.regions),
        region_clients,
        rpc_secret: RpcSecret::new(config.rpc_shared_secret),
        readiness: readiness.clone(),
        drain_signal,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    readiness.mark_ready();
    info!(mode = %config.mode, "control service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
