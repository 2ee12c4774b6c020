use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewQuoteRecord, QuoteRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Append-only store of completed quotes and projections.
///
/// Records are never updated or deleted once written.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn append_quote(
        &self,
        quote: NewQuoteRecord,
    ) -> Result<QuoteRecord, RepositoryError>;

    /// Quotes attributed to the signed-in user `uid`, newest first.
    async fn list_quotes_for_user(
        &self,
        uid: &str,
    ) -> Result<Vec<QuoteRecord>, RepositoryError>;

    async fn count_quotes(&self) -> Result<i64, RepositoryError>;
}
