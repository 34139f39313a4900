//! Feedback API Library
//!
//! This library exposes the core modules of the feedback service for use in
//! integration tests and by the binary.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{Error, Result};

// Re-export model types
pub use models::{
    normalize, CanonicalFeedback, ClientMetadata, Field, PersistedFeedback, ResearchOptIn,
    ValidationError,
};

// Re-export storage types
pub use db::{FeedbackRepository, InMemoryFeedbackRepository, PgFeedbackRepository};

// Re-export API server functions
pub use api::server::{create_router, create_server, shutdown_signal, AppState};
