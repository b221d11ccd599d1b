use silo_domain::outbox::{OutboxCategory, OutboxDirection, OutboxScope};

/// Outbox error variants.
///
/// `MisconfiguredCategory`, `UnresolvableScope` and `MissingRegion` are
/// programming errors in a producer: they are raised while the producing
/// transaction is still open so the mutation rolls back with them.
#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("category {category} cannot be written as a {attempted:?} record")]
    MisconfiguredCategory {
        category: OutboxCategory,
        attempted: OutboxDirection,
    },
    #[error("scope {0} has no region semantics")]
    UnresolvableScope(OutboxScope),
    #[error("control outbox for {0} has no destination region")]
    MissingRegion(OutboxCategory),
    #[error("unknown outbox category code {0}")]
    UnknownCategory(i32),
    #[error("unknown outbox scope code {0}")]
    UnknownScope(i32),
    #[error("scope {scope} does not match category {category}")]
    ScopeMismatch {
        category: OutboxCategory,
        scope: OutboxScope,
    },
    #[error("invalid {category} payload: {source}")]
    Payload {
        category: OutboxCategory,
        #[source]
        source: serde_json::Error,
    },
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}
