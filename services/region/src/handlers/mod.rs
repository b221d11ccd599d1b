pub mod organizations;
pub mod outbox;
pub mod slugs;
pub mod webhooks;
