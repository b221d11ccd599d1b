use std::time::Duration;

use anyhow::Context as _;

use silo_core::config::{or_default, required};
use silo_domain::silo::SiloMode;
use silo_outbox::DrainConfig;
use silo_rpc::attempts::DEFAULT_ATTEMPT_LIMIT;

/// Region service configuration loaded from environment variables.
#[derive(Debug)]
pub struct RegionConfig {
    pub database_url: String,
    pub redis_url: String,
    pub rpc_shared_secret: String,
    /// `region` or `monolith`. Env var: `SILO_MODE`.
    pub mode: SiloMode,
    /// TCP port to listen on (default 8200). Env var: `REGION_PORT`.
    pub port: u16,
    /// Name of this region in the control registry. Env var: `REGION_NAME`.
    pub region_name: String,
    /// Base URL of the control silo. Env var: `CONTROL_SILO_ADDRESS`.
    pub control_address: String,
    pub drain: DrainConfig,
    pub attempt_limit: u64,
}

impl RegionConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mode = or_default("SILO_MODE", SiloMode::Region)?;
        anyhow::ensure!(
            mode != SiloMode::Control,
            "region service cannot run with SILO_MODE=control"
        );
        let defaults = DrainConfig::default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            rpc_shared_secret: required("RPC_SHARED_SECRET")?,
            mode,
            port: or_default("REGION_PORT", 8200)?,
            region_name: required("REGION_NAME")?,
            control_address: required("CONTROL_SILO_ADDRESS")?,
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
