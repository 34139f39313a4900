//! Field validation functions for feedback submissions
//!
//! Each function checks one canonical field of an untyped JSON payload and
//! returns either the typed value or the first validation failure.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use super::error::{Field, ValidationError, ValidationResult};

/// Lowest accepted star rating
pub const RATING_MIN: i64 = 1;

/// Highest accepted star rating
pub const RATING_MAX: i64 = 5;

/// Maximum opinion length, counted in characters
pub const OPINION_MAX_CHARS: usize = 500;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Get or initialize the email regex pattern
fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex pattern")
    })
}

/// Check an address against the accepted email shape
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// JSON truthiness: `false`, `0`, `""`, `[]`, `{}` and `null` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Validate the rating.
///
/// `None` means the key was absent. Any present value, `null` included, must
/// be a JSON integer in range; booleans, floats (even `3.0`) and numeric
/// strings are rejected.
pub fn validate_rating(value: Option<&Value>) -> ValidationResult<u8> {
    let value =
        value.ok_or_else(|| ValidationError::new(Field::Rating, "Field 'rating' is required"))?;

    let number = match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => n,
        _ => {
            return Err(ValidationError::new(
                Field::Rating,
                "Field 'rating' must be an integer",
            ))
        },
    };

    match number.as_i64() {
        Some(rating) if (RATING_MIN..=RATING_MAX).contains(&rating) => Ok(rating as u8),
        _ => Err(ValidationError::new(
            Field::Rating,
            format!("Field 'rating' must be between {} and {}", RATING_MIN, RATING_MAX),
        )),
    }
}

/// Validate the optional opinion text
pub fn validate_opinion(value: Option<&Value>) -> ValidationResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };

    let text = value
        .as_str()
        .ok_or_else(|| ValidationError::new(Field::Opinion, "Opinion must be a string"))?;

    if text.chars().count() > OPINION_MAX_CHARS {
        return Err(ValidationError::new(
            Field::Opinion,
            format!("Opinion must be at most {} characters", OPINION_MAX_CHARS),
        ));
    }

    Ok(Some(text.to_string()))
}

/// Validate a contact email that is required
pub fn validate_email(value: Option<&Value>) -> ValidationResult<String> {
    let value = match value {
        Some(v) if is_truthy(v) => v,
        _ => {
            return Err(ValidationError::new(
                Field::Email,
                "Email is required when 'interested'",
            ))
        },
    };

    match value.as_str() {
        Some(email) if is_valid_email(email) => Ok(email.to_string()),
        _ => Err(ValidationError::new(Field::Email, "Email must be a valid address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_rating_accepts_range() {
        for rating in 1..=5 {
            assert_eq!(validate_rating(Some(&json!(rating))).unwrap(), rating as u8);
        }
    }

    #[test]
    fn test_validate_rating_rejects_non_integers() {
        let invalid =
            vec![json!(3.5), json!(3.0), json!("3"), json!(true), json!(null), json!([3])];

        for value in invalid {
            let err = validate_rating(Some(&value)).unwrap_err();
            assert_eq!(err.field, Field::Rating);
            assert_eq!(err.message, "Field 'rating' must be an integer");
        }
    }

    #[test]
    fn test_validate_rating_rejects_out_of_range() {
        for value in [json!(0), json!(6), json!(-1), json!(u64::MAX)] {
            let err = validate_rating(Some(&value)).unwrap_err();
            assert_eq!(err.message, "Field 'rating' must be between 1 and 5");
        }
    }

    #[test]
    fn test_validate_rating_missing() {
        let err = validate_rating(None).unwrap_err();
        assert_eq!(err.message, "Field 'rating' is required");
    }

    #[test]
    fn test_validate_opinion_length() {
        let exact = "a".repeat(OPINION_MAX_CHARS);
        assert_eq!(validate_opinion(Some(&json!(exact))).unwrap(), Some(exact));

        let too_long = "a".repeat(OPINION_MAX_CHARS + 1);
        let err = validate_opinion(Some(&json!(too_long))).unwrap_err();
        assert_eq!(err.field, Field::Opinion);
    }

    #[test]
    fn test_validate_opinion_counts_characters_not_bytes() {
        // 500 two-byte characters
        let text = "é".repeat(OPINION_MAX_CHARS);
        assert!(validate_opinion(Some(&json!(text))).is_ok());
    }

    #[test]
    fn test_validate_opinion_type() {
        assert_eq!(validate_opinion(None).unwrap(), None);
        assert!(validate_opinion(Some(&json!(42))).is_err());
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last+tag@sub.example.co.uk"));

        assert!(!is_valid_email("nope"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b .com"));
        assert!(!is_valid_email("a@b.com\n"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
    }

    #[test]
    fn test_validate_email_required() {
        for value in [None, Some(json!(null)), Some(json!("")), Some(json!(false))] {
            let err = validate_email(value.as_ref()).unwrap_err();
            assert_eq!(err.message, "Email is required when 'interested'");
        }
    }

    #[test]
    fn test_validate_email_format() {
        assert_eq!(validate_email(Some(&json!("a@b.com"))).unwrap(), "a@b.com");

        for value in [json!("nope"), json!("a@b"), json!(12), json!(["a@b.com"])] {
            let err = validate_email(Some(&value)).unwrap_err();
            assert_eq!(err.message, "Email must be a valid address");
        }
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!([0])));

        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(!is_truthy(&json!(null)));
    }
}
