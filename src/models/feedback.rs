//! Feedback data models
//!
//! This module defines the canonical feedback record produced by the
//! normalizer and the persisted record handed to the storage layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::{Field, ValidationError};

/// Whether the submitter agreed to be contacted for research
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchOptIn {
    /// No contact wanted; email is never stored
    NotInterested,
    /// Contact wanted; a valid email is mandatory
    Interested,
}

impl ResearchOptIn {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchOptIn::NotInterested => "not_interested",
            ResearchOptIn::Interested => "interested",
        }
    }

    /// Map the boolean wire form onto the enum
    pub fn from_interested(interested: bool) -> Self {
        if interested {
            ResearchOptIn::Interested
        } else {
            ResearchOptIn::NotInterested
        }
    }

    /// Check if the submitter opted in
    pub fn is_interested(&self) -> bool {
        matches!(self, ResearchOptIn::Interested)
    }
}

impl FromStr for ResearchOptIn {
    type Err = ValidationError;

    /// Parse one of the two exact literals; no case folding
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_interested" => Ok(ResearchOptIn::NotInterested),
            "interested" => Ok(ResearchOptIn::Interested),
            _ => Err(ValidationError::new(
                Field::ResearchOptin,
                "Must be 'not_interested' or 'interested'",
            )),
        }
    }
}

impl std::fmt::Display for ResearchOptIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validated, normalized feedback
///
/// `email` is `Some` exactly when `research_optin` is `Interested`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalFeedback {
    /// Star rating, 1 to 5
    pub rating: u8,

    /// Optional free text, at most 500 characters
    pub opinion: Option<String>,

    /// Research contact preference
    pub research_optin: ResearchOptIn,

    /// Contact email, only kept when interested
    pub email: Option<String>,
}

/// Request metadata captured by the transport layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// Forwarded address if the request carried one, else the peer address
    pub ip: Option<String>,

    /// Caller `User-Agent` header
    pub user_agent: Option<String>,
}

impl ClientMetadata {
    /// Resolve the caller address, preferring the forwarded header value
    pub fn new(
        forwarded_for: Option<&str>,
        remote_addr: Option<std::net::IpAddr>,
        user_agent: Option<&str>,
    ) -> Self {
        let ip = forwarded_for
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| remote_addr.map(|addr| addr.to_string()));

        Self {
            ip,
            user_agent: user_agent.map(str::to_string),
        }
    }
}

/// Feedback as written to storage: canonical fields plus server metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFeedback {
    /// Validated submission
    #[serde(flatten)]
    pub feedback: CanonicalFeedback,

    /// When the server accepted the submission
    pub created_at: DateTime<Utc>,

    /// Submitter network address
    pub ip: Option<String>,

    /// Submitter user agent
    pub user_agent: Option<String>,
}

impl PersistedFeedback {
    /// Stamp a canonical record with the current time and caller metadata
    pub fn new(feedback: CanonicalFeedback, client: ClientMetadata) -> Self {
        Self::with_timestamp(feedback, client, Utc::now())
    }

    /// Build with an explicit creation time
    pub fn with_timestamp(
        feedback: CanonicalFeedback,
        client: ClientMetadata,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            feedback,
            created_at,
            ip: client.ip,
            user_agent: client.user_agent,
        }
    }
}
