//! Database module for the feedback service
//!
//! This module provides the storage collaborator trait, a PostgreSQL
//! implementation with connection pooling, and an in-process implementation.

pub mod feedback_repo;
pub mod memory;
pub mod pool;
pub mod repository;

// Re-export commonly used types
pub use feedback_repo::PgFeedbackRepository;
pub use memory::InMemoryFeedbackRepository;
pub use pool::{create_pool, DbPool};
pub use repository::{FeedbackRepository, RepositoryError, RepositoryResult};
