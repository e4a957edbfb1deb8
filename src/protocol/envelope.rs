//! Envelope validation.
//!
//! [`parse_envelope`] tries the success shape first, then the error shape.
//! A body matching neither becomes a [`ValidationError`](crate::error::ValidationError)
//! carrying the issues found by both attempts.
//!
//! # Examples
//!
//! ```
//! use alldebrid::protocol::parse_envelope;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Sent {
//!     sent: bool,
//! }
//!
//! let parsed = parse_envelope::<Sent>(json!({
//!     "status": "success",
//!     "data": { "sent": true },
//!     "demo": "true"
//! }))
//! .unwrap();
//! assert!(parsed.data.sent);
//! assert!(parsed.demo);
//! ```

use crate::error::{
    classify_api_failure, classify_validation_failure, Result, ValidationIssue,
};
use crate::protocol::constants::status;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A validated success envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessEnvelope<T> {
    pub data: T,
    /// Served under a demo/restricted key rather than live data.
    pub demo: bool,
}

impl<T> SuccessEnvelope<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SuccessEnvelope<U> {
        SuccessEnvelope {
            data: f(self.data),
            demo: self.demo,
        }
    }
}

/// `error` object of an error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Typed form of the wire envelope, discriminated by `status`.
///
/// Deserializing normalizes `demo` the same way [`parse_envelope`] does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success {
        data: T,
        #[serde(default, deserialize_with = "deserialize_demo")]
        demo: bool,
    },
    Error {
        error: ErrorBody,
        #[serde(default, deserialize_with = "deserialize_demo")]
        demo: bool,
    },
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Envelope::Success { data, demo: false }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Envelope::Error {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            demo: false,
        }
    }
}

fn deserialize_demo<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(normalize_demo(value.as_ref()))
}

/// Normalize the `demo` flag: boolean `true` or the string `"true"` are
/// `true`, everything else (including absence) is `false`.
pub fn normalize_demo(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Short type description of a JSON value, used in issue messages.
pub fn describe_json(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

/// Validate `json` against the envelope and decode `data` as `T`.
///
/// Returns the success payload, an [`ApiError`](crate::error::ApiError) for a
/// well-formed error envelope, or a [`ValidationError`](crate::error::ValidationError)
/// when the body matches neither shape. The validation issue list is never
/// empty.
pub fn parse_envelope<T: DeserializeOwned>(json: Value) -> Result<SuccessEnvelope<T>> {
    let body = match json {
        Value::Object(map) => map,
        other => {
            let issue = ValidationIssue::new(
                "",
                format!("expected envelope object, received {}", describe_json(Some(&other))),
            );
            return Err(classify_validation_failure(vec![issue]).into());
        }
    };

    let demo = normalize_demo(body.get("demo"));

    let success_issues = match match_success::<T>(&body) {
        Ok(data) => return Ok(SuccessEnvelope { data, demo }),
        Err(issues) => issues,
    };

    let error_issues = match match_error(&body) {
        Ok(error) => return Err(classify_api_failure(&error.code, &error.message, demo).into()),
        Err(issues) => issues,
    };

    let mut issues = success_issues;
    issues.extend(error_issues);
    Err(classify_validation_failure(issues).into())
}

fn match_success<T: DeserializeOwned>(
    body: &Map<String, Value>,
) -> std::result::Result<T, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if let Some(issue) = check_discriminant(body, status::SUCCESS) {
        issues.push(issue);
    }

    let data = match body.get("data") {
        None => {
            issues.push(ValidationIssue::new("data", "required"));
            None
        }
        // `data` is only checked against `T` once the discriminant matched.
        Some(value) if issues.is_empty() => match T::deserialize(value) {
            Ok(data) => Some(data),
            Err(e) => {
                issues.push(ValidationIssue::new("data", e.to_string()));
                None
            }
        },
        Some(_) => None,
    };

    match data {
        Some(data) if issues.is_empty() => Ok(data),
        _ => Err(issues),
    }
}

fn match_error(body: &Map<String, Value>) -> std::result::Result<ErrorBody, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if let Some(issue) = check_discriminant(body, status::ERROR) {
        issues.push(issue);
    }

    let error = match body.get("error") {
        Some(Value::Object(error)) => {
            let code = required_string(error, "error.code", "code", &mut issues);
            let message = required_string(error, "error.message", "message", &mut issues);
            code.zip(message)
        }
        other => {
            issues.push(ValidationIssue::new(
                "error",
                format!("expected object, received {}", describe_json(other)),
            ));
            None
        }
    };

    match error {
        Some((code, message)) if issues.is_empty() => Ok(ErrorBody { code, message }),
        _ => Err(issues),
    }
}

fn check_discriminant(body: &Map<String, Value>, expected: &str) -> Option<ValidationIssue> {
    match body.get("status") {
        Some(Value::String(s)) if s == expected => None,
        Some(Value::String(s)) => Some(ValidationIssue::new(
            "status",
            format!("expected \"{expected}\", received \"{s}\""),
        )),
        other => Some(ValidationIssue::new(
            "status",
            format!("expected \"{expected}\", received {}", describe_json(other)),
        )),
    }
}

fn required_string(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<String> {
    match object.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        other => {
            issues.push(ValidationIssue::new(
                path,
                format!("expected string, received {}", describe_json(other)),
            ));
            None
        }
    }
}
