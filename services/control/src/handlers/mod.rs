pub mod organizations;
pub mod outbox;
pub mod slugs;
pub mod users;
pub mod webhooks;
