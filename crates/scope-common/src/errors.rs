//! Collaborator failure types.
//!
//! The display text of these errors is what the conversation layer's
//! failure classifier pattern-matches on, so every database-side variant
//! keeps "database" in its message.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("database query failed: {0}")]
    Query(String),

    #[error("database transaction rolled back: {0}")]
    Transaction(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("search query failed: {0}")]
    Query(String),
}
