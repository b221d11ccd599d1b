//! Test utilities for the silo services.
//!
//! In-memory stand-ins for the outbox store and the attempt cache, a
//! recording delivery, signed-request helpers and an HTTP server helper.
//! Import in `#[cfg(test)]` blocks and integration tests only.

pub mod attempts;
pub mod delivery;
pub mod http;
pub mod rpc;
pub mod store;
