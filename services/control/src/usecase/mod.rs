pub mod apply;
pub mod provision;
pub mod slug;
pub mod user;
pub mod webhook;
