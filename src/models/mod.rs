//! Data models for the feedback service
//!
//! This module contains the feedback records, the normalizer that reconciles
//! the accepted wire shapes, and the field validation it is built from.

pub mod error;
pub mod feedback;
pub mod normalize;
pub mod validation;

// Re-export commonly used types
pub use error::{Field, ValidationError, ValidationResult};
pub use feedback::{CanonicalFeedback, ClientMetadata, PersistedFeedback, ResearchOptIn};
pub use normalize::normalize;
pub use validation::{is_valid_email, OPINION_MAX_CHARS, RATING_MAX, RATING_MIN};
