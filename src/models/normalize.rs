//! Payload normalization
//!
//! Two wire shapes carry the same record:
//!
//! | canonical        | shape A          | shape B                  |
//! |------------------|------------------|--------------------------|
//! | `opinion`        | `opinion`        | `improvementText`        |
//! | `research_optin` | `research_optin` | `interestedInResearch`   |
//!
//! Aliases are resolved by an explicit lookup in which the canonical key
//! wins, then the fields are validated in a fixed order. The first failure
//! is returned.

use serde_json::{Map, Value};

use super::error::{Field, ValidationError, ValidationResult};
use super::feedback::{CanonicalFeedback, ResearchOptIn};
use super::validation::{is_truthy, validate_email, validate_opinion, validate_rating};

/// Keys that may carry one canonical field, in precedence order
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    /// Canonical key (shape A)
    pub canonical: &'static str,
    /// Alternate key (shape B), consulted only when the canonical key is absent
    pub alternate: Option<&'static str>,
}

impl FieldAliases {
    const fn same(key: &'static str) -> Self {
        Self {
            canonical: key,
            alternate: None,
        }
    }

    const fn aliased(canonical: &'static str, alternate: &'static str) -> Self {
        Self {
            canonical,
            alternate: Some(alternate),
        }
    }

    /// Look up the raw value for this field.
    ///
    /// A canonical key holding `null` still shadows the alternate key.
    pub fn resolve<'a>(&self, payload: &'a Map<String, Value>) -> Option<&'a Value> {
        match payload.get(self.canonical) {
            Some(value) => Some(value),
            None => self.alternate.and_then(|key| payload.get(key)),
        }
    }
}

// Scalar fields; the research opt-in changes type between shapes and is
// resolved separately.
pub const RATING_KEYS: FieldAliases = FieldAliases::same("rating");
pub const OPINION_KEYS: FieldAliases = FieldAliases::aliased("opinion", "improvementText");
pub const EMAIL_KEYS: FieldAliases = FieldAliases::same("email");

/// Shape A enum key for the research opt-in
pub const RESEARCH_OPTIN_KEY: &str = "research_optin";

/// Shape B boolean key for the research opt-in
pub const INTERESTED_IN_RESEARCH_KEY: &str = "interestedInResearch";

/// Treat JSON `null` as an absent value
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Resolve the research opt-in from either the enum or the boolean key
fn resolve_research_optin(payload: &Map<String, Value>) -> ValidationResult<ResearchOptIn> {
    let literal = present(payload.get(RESEARCH_OPTIN_KEY));
    let flag = present(payload.get(INTERESTED_IN_RESEARCH_KEY));

    match (literal, flag) {
        (Some(literal), _) => literal
            .as_str()
            .ok_or_else(|| {
                ValidationError::new(
                    Field::ResearchOptin,
                    "Must be 'not_interested' or 'interested'",
                )
            })?
            .parse(),
        (None, Some(flag)) => Ok(ResearchOptIn::from_interested(is_truthy(flag))),
        (None, None) => Err(ValidationError::new(
            Field::ResearchOptin,
            "Provide 'research_optin' or 'interestedInResearch'",
        )),
    }
}

/// Normalize a raw submission into a canonical feedback record.
///
/// Pure: the same input always yields the same record or the same failure.
/// When the opt-in resolves to not interested, any supplied email is dropped.
pub fn normalize(raw: &Value) -> ValidationResult<CanonicalFeedback> {
    let payload = raw.as_object().ok_or_else(ValidationError::body_not_object)?;

    let rating = validate_rating(RATING_KEYS.resolve(payload))?;
    let opinion = validate_opinion(present(OPINION_KEYS.resolve(payload)))?;
    let research_optin = resolve_research_optin(payload)?;

    let email = if research_optin.is_interested() {
        Some(validate_email(EMAIL_KEYS.resolve(payload))?)
    } else {
        None
    };

    Ok(CanonicalFeedback {
        rating,
        opinion,
        research_optin,
        email,
    })
}
