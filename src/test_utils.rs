//! Test utilities for the feedback service
//!
//! This module provides a mock repository and payload fixtures for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::db::repository::{FeedbackRepository, RepositoryError, RepositoryResult};
use crate::db::InMemoryFeedbackRepository;
use crate::models::{CanonicalFeedback, ClientMetadata, PersistedFeedback, ResearchOptIn};

/// Mock implementation of FeedbackRepository for testing
#[derive(Debug, Clone, Default)]
pub struct MockFeedbackRepository {
    inner: InMemoryFeedbackRepository,
    fail_next: Arc<Mutex<Option<String>>>,
    insert_attempts: Arc<AtomicUsize>,
}

impl MockFeedbackRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on the next operation
    pub fn fail_next_operation(&self, error_message: &str) {
        *self.fail_next.lock().unwrap() = Some(error_message.to_string());
    }

    /// Number of insert calls, successful or not
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// Get all stored records
    pub async fn get_all(&self) -> Vec<(Uuid, PersistedFeedback)> {
        self.inner.all().await
    }

    fn check_failure(&self) -> RepositoryResult<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(msg) => Err(RepositoryError::QueryExecution(msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FeedbackRepository for MockFeedbackRepository {
    async fn insert(&self, feedback: &PersistedFeedback) -> RepositoryResult<Uuid> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.inner.insert(feedback).await
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<PersistedFeedback>> {
        self.check_failure()?;
        self.inner.find_by_id(id).await
    }

    async fn count(&self) -> RepositoryResult<i64> {
        self.check_failure()?;
        self.inner.count().await
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        self.check_failure()?;
        self.inner.health_check().await
    }
}

/// Create a test PersistedFeedback with default values
pub fn create_test_feedback() -> PersistedFeedback {
    PersistedFeedback::new(
        CanonicalFeedback {
            rating: 4,
            opinion: Some("Works well".to_string()),
            research_optin: ResearchOptIn::Interested,
            email: Some("tester@example.com".to_string()),
        },
        ClientMetadata::new(Some("198.51.100.4"), None, Some("test-agent/1.0")),
    )
}

/// Valid submission in the canonical (shape A) form
pub fn shape_a_payload() -> Value {
    json!({
        "rating": 5,
        "opinion": "great",
        "research_optin": "interested",
        "email": "a@b.com"
    })
}

/// Valid submission in the client (shape B) form
pub fn shape_b_payload() -> Value {
    json!({
        "rating": 4,
        "improvementText": "x",
        "interestedInResearch": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_repository() {
        let repo = MockFeedbackRepository::new();
        let doc = create_test_feedback();

        let id = repo.insert(&doc).await.unwrap();
        assert_eq!(repo.find_by_id(id).await.unwrap(), Some(doc));
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(repo.insert_attempts(), 1);
    }

    #[tokio::test]
    async fn test_mock_repository_failure() {
        let repo = MockFeedbackRepository::new();
        let doc = create_test_feedback();

        repo.fail_next_operation("Test error");

        // Should fail once
        assert!(repo.insert(&doc).await.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);

        // Should succeed after failure
        assert!(repo.insert(&doc).await.is_ok());
        assert_eq!(repo.insert_attempts(), 2);
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = MockFeedbackRepository::new();
        assert!(repo.health_check().await.is_ok());

        repo.fail_next_operation("Health check failed");
        assert!(repo.health_check().await.is_err());
    }
}
