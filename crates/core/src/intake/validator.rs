//! Submission validation and ticket identity assignment.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::ticket::{generate_ticket_id, ProblemType};

/// Maximum number of whitespace-separated words in a title.
pub const MAX_TITLE_WORDS: usize = 10;

/// Maximum number of characters in a description.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid {}", .0.replace('_', " "))]
    InvalidFormat(&'static str),

    /// Field, limit, unit.
    #[error("{} exceeds {} {}", limit_subject(.0), .1, unit_name(.2))]
    ExceedsLimit(&'static str, usize, &'static str),
}

fn limit_subject(field: &str) -> &str {
    match field {
        "title" => "Ticket title",
        "description" => "Description",
        other => other,
    }
}

fn unit_name(unit: &str) -> &str {
    match unit {
        "chars" => "characters",
        other => other,
    }
}

impl ValidationError {
    /// Short machine-readable reason, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidFormat(_) => "invalid_format",
            ValidationError::ExceedsLimit(..) => "exceeds_limit",
        }
    }
}

/// A submission as received, before any checks.
///
/// Every field is optional so that a missing field is reported as a
/// validation failure rather than a parse failure. Non-string JSON values are
/// rendered as their JSON text, so they fail the field's own check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default, deserialize_with = "value_as_string")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "value_as_string")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "value_as_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "value_as_string")]
    pub ticket_title: Option<String>,
    #[serde(default, deserialize_with = "value_as_string")]
    pub problem_type: Option<String>,
    #[serde(default, deserialize_with = "value_as_string")]
    pub ticket_description: Option<String>,
}

fn value_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(other) => Ok(Some(other.to_string())),
    }
}

/// A submission that passed validation, with its assigned identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub ticket_title: String,
    pub problem_type: ProblemType,
    pub ticket_description: String,
    pub ticket_id: String,
    /// Epoch seconds at validation time.
    pub created_at: i64,
}

/// Validate a submission against the current clock.
pub fn validate(raw: &RawSubmission) -> Result<ValidatedRequest, ValidationError> {
    validate_at(raw, Utc::now())
}

/// Validate a submission, stamping it with `now`.
///
/// Checks run in a fixed order and the first failure is returned. Pure apart
/// from the random ticket ID suffix.
pub fn validate_at(
    raw: &RawSubmission,
    now: DateTime<Utc>,
) -> Result<ValidatedRequest, ValidationError> {
    let first_name = required("first_name", &raw.first_name)?;
    let last_name = required("last_name", &raw.last_name)?;
    let email = required("email", &raw.email)?;
    let ticket_title = required("ticket_title", &raw.ticket_title)?;
    let problem_type = required("problem_type", &raw.problem_type)?;
    let ticket_description = required("ticket_description", &raw.ticket_description)?;

    if !is_valid_name(first_name) || !is_valid_name(last_name) {
        return Err(ValidationError::InvalidFormat("name"));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    if ticket_title.split_whitespace().count() > MAX_TITLE_WORDS {
        return Err(ValidationError::ExceedsLimit("title", MAX_TITLE_WORDS, "words"));
    }

    let problem_type: ProblemType = problem_type
        .parse()
        .map_err(|_| ValidationError::InvalidFormat("problem_type"))?;

    if ticket_description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::ExceedsLimit(
            "description",
            MAX_DESCRIPTION_CHARS,
            "chars",
        ));
    }

    Ok(ValidatedRequest {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        ticket_title: ticket_title.to_string(),
        problem_type,
        ticket_description: ticket_description.to_string(),
        ticket_id: generate_ticket_id(now),
        created_at: now.timestamp(),
    })
}

fn required<'a>(
    name: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, ValidationError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(name)),
    }
}

/// Letters from any script, apostrophes, hyphens and spaces.
///
/// Letter-numbers such as roman numerals carry the Alphabetic property but are
/// numeric, so they are rejected. Combining marks are not letters: names must
/// arrive precomposed (NFC).
fn is_valid_name(value: &str) -> bool {
    value.chars().all(|c| {
        (c.is_alphabetic() && !c.is_numeric()) || c == '\'' || c == '-' || c == ' '
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::raw_submission;
    use chrono::TimeZone;

    fn with<F: FnOnce(&mut RawSubmission)>(f: F) -> RawSubmission {
        let mut raw = raw_submission();
        f(&mut raw);
        raw
    }

    #[test]
    fn test_valid_submission() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let request = validate_at(&raw_submission(), now).unwrap();

        assert_eq!(request.first_name, "Ada");
        assert_eq!(request.email, "ada@example.com");
        assert_eq!(request.problem_type, ProblemType::Hardware);
        assert_eq!(request.created_at, now.timestamp());
        assert!(request.ticket_id.starts_with("Ticket-01-05-2024-"));
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let raw = RawSubmission::default();
        assert_eq!(
            validate(&raw).unwrap_err(),
            ValidationError::MissingField("first_name")
        );

        let raw = with(|r| r.ticket_title = None);
        assert_eq!(
            validate(&raw).unwrap_err(),
            ValidationError::MissingField("ticket_title")
        );
    }

    #[test]
    fn test_blank_field_is_missing() {
        let raw = with(|r| r.ticket_description = Some("   \t".to_string()));
        assert_eq!(
            validate(&raw).unwrap_err(),
            ValidationError::MissingField("ticket_description")
        );
    }

    #[test]
    fn test_names_accept_letters_apostrophe_hyphen_space() {
        for name in ["O'Brien", "Jean-Luc", "Mary Ann", "Zoë", "Łukasz", "Ñúñez"] {
            let raw = with(|r| r.first_name = Some(name.to_string()));
            assert!(validate(&raw).is_ok(), "{} should be accepted", name);
        }
    }

    #[test]
    fn test_names_reject_digits_and_symbols() {
        let names = [
            "Ada1", "Ada!", "Ada_L", "Ada.L", "A@da", "Henry Ⅷ", "Ⅻ", "Jose\u{301}",
        ];
        for name in names {
            let raw = with(|r| r.last_name = Some(name.to_string()));
            assert_eq!(
                validate(&raw).unwrap_err(),
                ValidationError::InvalidFormat("name"),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_email_format() {
        let raw = with(|r| r.email = Some("a@b.co".to_string()));
        assert!(validate(&raw).is_ok());

        for email in ["a@b", "a.com", "a@b.c", "a b@c.com", "@b.co"] {
            let raw = with(|r| r.email = Some(email.to_string()));
            assert_eq!(
                validate(&raw).unwrap_err(),
                ValidationError::InvalidFormat("email"),
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn test_title_word_limit() {
        let ten = vec!["word"; 10].join(" ");
        let raw = with(|r| r.ticket_title = Some(ten));
        assert!(validate(&raw).is_ok());

        let eleven = vec!["word"; 11].join(" ");
        let raw = with(|r| r.ticket_title = Some(eleven));
        assert_eq!(
            validate(&raw).unwrap_err(),
            ValidationError::ExceedsLimit("title", 10, "words")
        );
    }

    #[test]
    fn test_problem_type_case_insensitive() {
        for value in ["Hardware", "hardware", "HARDWARE", "Other/Miscellaneous"] {
            let raw = with(|r| r.problem_type = Some(value.to_string()));
            assert!(validate(&raw).is_ok(), "{} should be accepted", value);
        }

        let raw = with(|r| r.problem_type = Some("unknown".to_string()));
        assert_eq!(
            validate(&raw).unwrap_err(),
            ValidationError::InvalidFormat("problem_type")
        );
    }

    #[test]
    fn test_description_char_limit() {
        let raw = with(|r| r.ticket_description = Some("a".repeat(500)));
        assert!(validate(&raw).is_ok());

        let raw = with(|r| r.ticket_description = Some("a".repeat(501)));
        assert_eq!(
            validate(&raw).unwrap_err(),
            ValidationError::ExceedsLimit("description", 500, "chars")
        );
    }

    #[test]
    fn test_description_limit_counts_characters_not_bytes() {
        let raw = with(|r| r.ticket_description = Some("é".repeat(500)));
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::MissingField("email").to_string(),
            "Missing required field: email"
        );
        assert_eq!(ValidationError::InvalidFormat("name").to_string(), "Invalid name");
        assert_eq!(
            ValidationError::InvalidFormat("problem_type").to_string(),
            "Invalid problem type"
        );
        assert_eq!(
            ValidationError::ExceedsLimit("title", 10, "words").to_string(),
            "Ticket title exceeds 10 words"
        );
        assert_eq!(
            ValidationError::ExceedsLimit("description", 500, "chars").to_string(),
            "Description exceeds 500 characters"
        );
    }

    #[test]
    fn test_raw_submission_accepts_scalars() {
        let raw: RawSubmission = serde_json::from_str(
            r#"{"first_name": "Ada", "ticket_title": 42, "email": null}"#,
        )
        .unwrap();
        assert_eq!(raw.ticket_title.as_deref(), Some("42"));
        assert!(raw.email.is_none());
        assert!(raw.last_name.is_none());
    }

    #[test]
    fn test_nested_values_fail_field_validation() {
        let mut raw: RawSubmission = serde_json::from_str(
            r#"{"first_name": {"x": 1}, "last_name": ["Lovelace"]}"#,
        )
        .unwrap();
        assert_eq!(raw.first_name.as_deref(), Some(r#"{"x":1}"#));
        assert_eq!(raw.last_name.as_deref(), Some(r#"["Lovelace"]"#));

        let valid = raw_submission();
        raw.email = valid.email;
        raw.ticket_title = valid.ticket_title;
        raw.problem_type = valid.problem_type;
        raw.ticket_description = valid.ticket_description;
        assert_eq!(
            validate(&raw).unwrap_err(),
            ValidationError::InvalidFormat("name")
        );
    }
}
