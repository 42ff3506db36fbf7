//! Turns the model's free-text reply into validated structured feedback.
//!
//! The reply is unreliable prose: it may wrap the JSON in markdown code
//! fences and may or may not use the requested `ats_feedback` envelope.
//! All schema enforcement happens here; a bad reply is surfaced to the
//! caller, never retried.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::models::{AtsFeedback, RoleFeedback};

#[derive(Debug, Error)]
pub enum FeedbackParseError {
    #[error("malformed JSON in model response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model response is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid feedback for role '{role}': {reason}")]
    Schema { role: String, reason: String },
}

/// Strips a leading/trailing markdown code fence (optionally tagged `json`).
///
/// A leading fence is dropped through the first newline; when the whole
/// reply sits on one line only the three fence characters are dropped.
pub fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if text.starts_with("```") {
        text = match text.find('\n') {
            Some(idx) => text[idx + 1..].trim(),
            None => text[3..].trim(),
        };
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped.trim();
    }
    text
}

#[derive(Deserialize)]
struct Envelope {
    ats_feedback: IndexMap<String, Value>,
}

/// Parses a model reply into [`AtsFeedback`].
///
/// Every top-level key other than `name`/`email` is a role name; role order
/// is preserved. Each role's feedback is deserialized and range-checked
/// against the fixed schema.
pub fn parse_feedback(raw: &str) -> Result<AtsFeedback, FeedbackParseError> {
    let cleaned = strip_code_fences(raw);

    let fields: IndexMap<String, Value> = match serde_json::from_str::<Envelope>(cleaned) {
        Ok(envelope) => envelope.ats_feedback,
        // No envelope: treat the top-level object as the feedback itself.
        Err(_) => serde_json::from_str(cleaned)?,
    };

    let mut name = None;
    let mut email = None;
    let mut roles = IndexMap::new();

    for (key, value) in fields {
        if key == "name" {
            name = value.as_str().map(str::to_string);
        } else if key == "email" {
            email = value.as_str().map(str::to_string);
        } else {
            let feedback: RoleFeedback =
                serde_json::from_value(value).map_err(|e| FeedbackParseError::Schema {
                    role: key.clone(),
                    reason: e.to_string(),
                })?;
            feedback
                .validate()
                .map_err(|reason| FeedbackParseError::Schema {
                    role: key.clone(),
                    reason,
                })?;
            roles.insert(key, feedback);
        }
    }

    Ok(AtsFeedback {
        name: name.ok_or(FeedbackParseError::MissingField("name"))?,
        email: email.ok_or(FeedbackParseError::MissingField("email"))?,
        roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::models::fixtures::sample_role_value;
    use serde_json::json;

    fn feedback_json() -> String {
        json!({
            "ats_feedback": {
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "Backend Engineer": sample_role_value(),
                "Data Analyst": sample_role_value()
            }
        })
        .to_string()
    }

    #[test]
    fn test_strip_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_single_line() {
        let input = "```{\"key\": \"value\"}```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_fenced_reply() {
        let raw = format!("```json\n{}\n```", feedback_json());
        let feedback = parse_feedback(&raw).unwrap();
        assert_eq!(feedback.name, "Ada Lovelace");
        assert_eq!(feedback.email, "ada@example.com");
        assert_eq!(feedback.roles.len(), 2);
    }

    #[test]
    fn test_role_keys_keep_document_order() {
        let raw = json!({
            "ats_feedback": {
                "name": "Ada",
                "email": "ada@example.com",
                "Zoologist": sample_role_value(),
                "Backend Engineer": sample_role_value(),
                "Analyst": sample_role_value()
            }
        })
        .to_string();
        let feedback = parse_feedback(&raw).unwrap();
        let keys: Vec<&String> = feedback.roles.keys().collect();
        assert_eq!(keys, ["Zoologist", "Backend Engineer", "Analyst"]);
    }

    #[test]
    fn test_reply_without_envelope_is_accepted() {
        let raw = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "Backend Engineer": sample_role_value()
        })
        .to_string();
        let feedback = parse_feedback(&raw).unwrap();
        assert_eq!(feedback.roles.len(), 1);
    }

    #[test]
    fn test_identity_keys_are_not_roles() {
        let feedback = parse_feedback(&feedback_json()).unwrap();
        assert!(!feedback.roles.contains_key("name"));
        assert!(!feedback.roles.contains_key("email"));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let err = parse_feedback("this is not json").unwrap_err();
        assert!(matches!(err, FeedbackParseError::Json(_)));
    }

    #[test]
    fn test_truncated_json_is_a_parse_error() {
        let mut raw = feedback_json();
        raw.truncate(raw.len() / 2);
        let err = parse_feedback(&raw).unwrap_err();
        assert!(matches!(err, FeedbackParseError::Json(_)));
    }

    #[test]
    fn test_role_missing_fields_names_the_role() {
        let raw = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "Backend Engineer": {"strengths": ["incomplete"]}
        })
        .to_string();
        let err = parse_feedback(&raw).unwrap_err();
        match err {
            FeedbackParseError::Schema { role, .. } => assert_eq!(role, "Backend Engineer"),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_score_is_a_schema_error() {
        let mut role = sample_role_value();
        role["ats_score"]["overall"] = serde_json::Value::from(250.0);
        let raw = json!({
            "name": "Ada",
            "email": "ada@example.com",
            "Backend Engineer": role
        })
        .to_string();
        let err = parse_feedback(&raw).unwrap_err();
        assert!(matches!(err, FeedbackParseError::Schema { .. }));
    }

    #[test]
    fn test_missing_identity_fields() {
        let raw = json!({"ats_feedback": {"email": "ada@example.com"}}).to_string();
        let err = parse_feedback(&raw).unwrap_err();
        assert!(matches!(err, FeedbackParseError::MissingField("name")));
    }
}
