use sea_orm::Database;
use tracing::info;

use silo_core::health::Readiness;
use silo_core::tracing::init_tracing;
use silo_outbox::{DrainSignal, OutboxDrainer, OutboxTable, SeaOutboxStore};
use silo_region::config::RegionConfig;
use silo_region::infra::delivery::ControlDelivery;
use silo_region::router::build_router;
use silo_region::state::AppState;
use silo_rpc::{RedisAttemptCache, RpcSecret, SiloClient};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = RegionConfig::from_env().expect("invalid region configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let control_client = SiloClient::control(
        config.mode,
        &config.control_address,
        config.rpc_shared_secret.clone(),
        RedisAttemptCache { pool: redis },
        config.attempt_limit,
    )
    .and_then(|client| client.with_timeout(config.drain.delivery_deadline()))
    .expect("failed to build control client");

    let drain_signal = DrainSignal::new();
    let drainer = OutboxDrainer::new(
        SeaOutboxStore::new(db.clone(), OutboxTable::Region),
        ControlDelivery::new(control_client),
    )
    .with_config(config.drain);
    let drainer_signal = drain_signal.clone();
    tokio::spawn(async move {
        drainer.run(drainer_signal, shutdown_signal()).await;
    });

    let readiness = Readiness::default();
    let state = AppState {
        db,
        region_name: config.region_name.clone(),
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
    info!(
        mode = %config.mode,
        region = %config.region_name,
        "region service listening on {addr}"
    );
    axum::serve(listener, router)
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
