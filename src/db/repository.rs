//! Storage collaborator abstraction
//!
//! This module defines the repository trait the request handler writes
//! through, and the error type shared by its implementations.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PersistedFeedback;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query execution error: {0}")]
    QueryExecution(String),

    /// Stored row could not be mapped back to a record
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convert repository errors to application errors
impl From<RepositoryError> for crate::error::Error {
    fn from(err: RepositoryError) -> Self {
        crate::error::Error::database(err.to_string())
    }
}

/// Storage collaborator for feedback records.
///
/// Implementations are shared across requests behind an `Arc` and handle
/// their own synchronization.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Insert one record and return the identifier the store assigned to it
    async fn insert(&self, feedback: &PersistedFeedback) -> RepositoryResult<Uuid>;

    /// Find a record by its identifier
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<PersistedFeedback>>;

    /// Count stored records
    async fn count(&self) -> RepositoryResult<i64>;

    /// Health check for the repository
    async fn health_check(&self) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::STORAGE_FAILURE_MESSAGE;

    #[test]
    fn test_repository_error_maps_to_database_error() {
        let err: crate::error::Error =
            RepositoryError::QueryExecution("duplicate key".to_string()).into();

        assert!(matches!(err, crate::error::Error::Database(_)));
        assert_eq!(err.to_body().error, STORAGE_FAILURE_MESSAGE);
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Connection("refused".to_string());
        assert_eq!(err.to_string(), "Database connection error: refused");
    }
}
