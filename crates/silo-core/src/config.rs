//! Env-var helpers shared by the service config structs.
//!
//! Each service owns a plain `*Config` struct with a `from_env()` constructor;
//! these helpers keep the error messages uniform so a misconfigured deployment
//! fails at startup with the name of the offending variable.

use std::str::FromStr;

use anyhow::{Context as _, anyhow};

/// Read a required env var.
pub fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing required env var {name}"))
}

/// Read and parse an optional env var, falling back to `default` when unset.
///
/// A value that is present but unparsable is an error rather than a silent fallback.
pub fn or_default<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

/// Parse an already-read value; split out so parsing is testable without
/// touching process env.
pub fn parse_value<T>(name: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| anyhow!("invalid value for env var {name}: {e}"))
}
