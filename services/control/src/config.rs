use std::time::Duration;

use anyhow::Context as _;

use silo_core::config::{or_default, required};
use silo_domain::region::RegionRegistry;
use silo_domain::silo::SiloMode;
use silo_outbox::DrainConfig;
use silo_rpc::attempts::DEFAULT_ATTEMPT_LIMIT;

/// Control service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ControlConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (request attempt counters).
    pub redis_url: String,
    /// HMAC secret shared by every silo for signing internal requests.
    pub rpc_shared_secret: String,
    /// `control` or `monolith`. Env var: `SILO_MODE`.
    pub mode: SiloMode,
    /// TCP port to listen on (default 8100). Env var: `CONTROL_PORT`.
    pub port: u16,
    /// Region registry. Env var: `SILO_REGIONS`, a JSON array of `{name, address}`.
    pub regions: RegionRegistry,
    pub drain: DrainConfig,
    /// Env var: `REQUEST_ATTEMPTS_LIMIT` (default 10).
    pub attempt_limit: u64,
}

impl ControlConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mode = or_default("SILO_MODE", SiloMode::Control)?;
        anyhow::ensure!(
            mode != SiloMode::Region,
            "control service cannot run with SILO_MODE=region"
        );
        let regions = RegionRegistry::from_json(&required("SILO_REGIONS")?)
            .context("invalid SILO_REGIONS")?;
        let defaults = DrainConfig::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            rpc_shared_secret: required("RPC_SHARED_SECRET")?,
            mode,
            port: or_default("CONTROL_PORT", 8100)?,
            regions,
            drain: DrainConfig {
                batch_size: or_default("DRAIN_BATCH_SIZE", defaults.batch_size)?,
                concurrency: or_default("DRAIN_CONCURRENCY", defaults.concurrency)?,
                poll_interval: Duration::from_secs(or_default(
                    "DRAIN_INTERVAL_SECS",
                    defaults.poll_interval.as_secs(),
                )?),
                ..defaults
            }
            .validated()
            .context("invalid drain settings")?,
            attempt_limit: or_default("REQUEST_ATTEMPTS_LIMIT", DEFAULT_ATTEMPT_LIMIT)?,
        })
    }
}
