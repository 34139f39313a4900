//! Validation error types for feedback submissions
//!
//! This module defines the failure value returned by the normalizer,
//! separate from the general application errors.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field identifier reported back to the client on a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The request body as a whole
    Body,
    /// Star rating
    Rating,
    /// Free-text opinion (`opinion` / `improvementText`)
    Opinion,
    /// Research opt-in (`research_optin` / `interestedInResearch`)
    ResearchOptin,
    /// Contact email
    Email,
}

impl Field {
    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Body => "body",
            Field::Rating => "rating",
            Field::Opinion => "opinion",
            Field::ResearchOptin => "research_optin",
            Field::Email => "email",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure: which field failed and why.
///
/// Validation stops at the first failure, so there is never more than one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// The field that failed validation
    pub field: Field,
    /// Human-readable message, safe to return to the client
    pub message: Cow<'static, str>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: Field, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// Body is not a JSON object
    pub fn body_not_object() -> Self {
        Self::new(Field::Body, "Request body must be a JSON object")
    }

    /// Request did not declare a JSON content type
    pub fn body_not_json() -> Self {
        Self::new(Field::Body, "Content-Type must be application/json")
    }
}

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Convert validation errors to application errors
impl From<ValidationError> for crate::error::Error {
    fn from(err: ValidationError) -> Self {
        crate::error::Error::Validation(err)
    }
}
