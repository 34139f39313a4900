//! In-process feedback repository
//!
//! Used when `STORAGE_BACKEND=memory` and by tests. Contents live only as
//! long as the process.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::repository::{FeedbackRepository, RepositoryResult};
use crate::models::PersistedFeedback;

/// Feedback records held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedbackRepository {
    records: Arc<RwLock<Vec<(Uuid, PersistedFeedback)>>>,
}

impl InMemoryFeedbackRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record with its identifier
    pub async fn all(&self) -> Vec<(Uuid, PersistedFeedback)> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn insert(&self, feedback: &PersistedFeedback) -> RepositoryResult<Uuid> {
        let id = Uuid::new_v4();
        self.records.write().await.push((id, feedback.clone()));
        Ok(id)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<PersistedFeedback>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|(key, _)| *key == id).map(|(_, doc)| doc.clone()))
    }

    async fn count(&self) -> RepositoryResult<i64> {
        Ok(self.records.read().await.len() as i64)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_feedback;

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let repo = InMemoryFeedbackRepository::new();
        let doc = create_test_feedback();

        let first = repo.insert(&doc).await.unwrap();
        let second = repo.insert(&doc).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = InMemoryFeedbackRepository::new();
        let doc = create_test_feedback();

        let id = repo.insert(&doc).await.unwrap();

        assert_eq!(repo.find_by_id(id).await.unwrap(), Some(doc));
        assert_eq!(repo.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryFeedbackRepository::new();
        let clone = repo.clone();

        clone.insert(&create_test_feedback()).await.unwrap();

        assert_eq!(repo.all().await.len(), 1);
        assert!(repo.health_check().await.is_ok());
    }
}
