//! Shared service plumbing for the silo services.
//!
//! Everything here is framework glue: tracing setup, the common error body,
//! health checks, request ids and env-var helpers. Nothing in this crate knows
//! about outboxes or silos.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
