//! Domain types shared by the Control and Region silos.
//!
//! This crate contains only pure types with no framework dependencies.
//! The integer codes in [`outbox`] are a frozen wire contract: append, never renumber.

pub mod id;
pub mod outbox;
pub mod payload;
pub mod region;
pub mod silo;
pub mod slug;
