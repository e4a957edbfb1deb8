//! Error taxonomy for the AllDebrid client.
//!
//! Every failure a call can produce is one of four kinds:
//!
//! | Kind | Raised when | Retryable |
//! |------|-------------|-----------|
//! | [`NetworkError`] | The transport failed or the server answered 5xx/429 | 5xx, 429, reset, timeout, DNS |
//! | [`ApiError`] | The API returned an `{"status":"error"}` envelope | only `RateLimit` subtype |
//! | [`ValidationError`] | The body did not match the expected envelope/data shape | never |
//! | [`ConfigurationError`] | The client was used unconfigured or misconfigured | never |
//!
//! The classification functions in this module are pure: they never log,
//! sleep or touch the network.
//!
//! # Examples
//!
//! ```
//! use alldebrid::error::{classify_api_failure, ApiErrorSubtype};
//!
//! let err = classify_api_failure("AUTH_BAD_APIKEY", "The auth apikey is invalid", false);
//! assert_eq!(err.subtype, ApiErrorSubtype::Auth);
//! assert!(!err.retryable);
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Discriminant of an [`SdkError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Network,
    Api,
    Validation,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Api => "api",
            ErrorKind::Validation => "validation",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any error surfaced by the client.
///
/// This is a closed union: callers branch on [`SdkError::kind`] (and on
/// [`ApiError::subtype`] for API errors) rather than on message text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SdkError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::Network(_) => ErrorKind::Network,
            SdkError::Api(_) => ErrorKind::Api,
            SdkError::Validation(_) => ErrorKind::Validation,
            SdkError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the failed operation may succeed if attempted again unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Network(e) => e.retryable,
            SdkError::Api(e) => e.retryable,
            SdkError::Validation(_) | SdkError::Configuration(_) => false,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SdkError::Network(e) => e.timestamp,
            SdkError::Api(e) => e.timestamp,
            SdkError::Validation(e) => e.timestamp,
            SdkError::Configuration(e) => e.timestamp,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            SdkError::Network(e) => e.request_id.as_deref(),
            SdkError::Api(e) => e.request_id.as_deref(),
            SdkError::Validation(e) => e.request_id.as_deref(),
            SdkError::Configuration(_) => None,
        }
    }

    /// Stamp the id of the logical call that produced this error.
    ///
    /// Configuration errors happen before a call exists and are returned
    /// unchanged.
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        let request_id = Some(request_id.into());
        match self {
            SdkError::Network(e) => SdkError::Network(NetworkError { request_id, ..e }),
            SdkError::Api(e) => SdkError::Api(ApiError { request_id, ..e }),
            SdkError::Validation(e) => SdkError::Validation(ValidationError { request_id, ..e }),
            other => other,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            SdkError::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Low-level failure kinds reported by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The peer reset or closed the connection mid-exchange.
    ConnectionReset,
    /// The attempt exceeded its timeout.
    TimedOut,
    /// DNS resolution failed.
    NameNotResolved,
    /// Connecting failed for another reason (refused, TLS, ...).
    Connect,
    /// The caller cancelled the call.
    Aborted,
    /// The server answered with a failure status.
    Status,
    /// Anything else (body read errors, request building, ...).
    Other,
}

impl TransportErrorKind {
    /// Connection-class failures that are worth retrying without a status code.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportErrorKind::ConnectionReset
                | TransportErrorKind::TimedOut
                | TransportErrorKind::NameNotResolved
        )
    }
}

/// The underlying cause of a [`NetworkError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timed_out(after: std::time::Duration) -> Self {
        Self::new(
            TransportErrorKind::TimedOut,
            format!("request timed out after {}ms", after.as_millis()),
        )
    }

    pub fn aborted() -> Self {
        Self::new(TransportErrorKind::Aborted, "request was aborted")
    }

    pub fn status(status: u16, body: &str) -> Self {
        let snippet: String = body.chars().take(200).collect();
        let message = if snippet.is_empty() {
            format!("server responded with status {status}")
        } else {
            format!("server responded with status {status}: {snippet}")
        };
        Self::new(TransportErrorKind::Status, message)
    }
}

/// Transport-level failure.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}", network_message(.cause, .status_code))]
pub struct NetworkError {
    pub cause: TransportError,
    pub status_code: Option<u16>,
    pub retryable: bool,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

fn network_message(cause: &TransportError, status_code: &Option<u16>) -> String {
    match status_code {
        Some(status) => format!("Network error ({status}): {cause}"),
        None => format!("Network error: {cause}"),
    }
}

/// Finer-grained classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiErrorSubtype {
    Auth,
    RateLimit,
    NotFound,
    Unknown,
}

/// The API explicitly answered with an error envelope.
#[derive(Debug, Clone, thiserror::Error)]
#[error("API error ({code}): {original_message}")]
pub struct ApiError {
    pub code: String,
    pub original_message: String,
    pub subtype: ApiErrorSubtype,
    pub retryable: bool,
    pub demo: bool,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One mismatch between a response body and the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted path into the body, empty for the root.
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// The response did not match the expected schema.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Validation error: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// A shape mismatch is a contract violation; retrying cannot fix it.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// The client was used before being configured, or with invalid options.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Configuration error: {message}")]
pub struct ConfigurationError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ConfigurationError {
    pub fn is_retryable(&self) -> bool {
        false
    }
}

/// Classify a transport failure.
///
/// With a known HTTP status the error is retryable for 5xx and 429 only;
/// without one it is retryable for connection resets, timeouts and DNS
/// failures.
pub fn classify_network_failure(cause: TransportError, status_code: Option<u16>) -> NetworkError {
    let retryable = match status_code {
        Some(status) => status >= 500 || status == 429,
        None => cause.kind.is_transient(),
    };
    NetworkError {
        cause,
        status_code,
        retryable,
        request_id: None,
        timestamp: Utc::now(),
    }
}

/// Classify an error envelope returned by the API.
///
/// Matching is case-insensitive and ordered: `AUTH` prefix, then `RATE` or
/// `LIMIT`, then `NOT_FOUND` or `UNKNOWN_TORRENT`.
pub fn classify_api_failure(code: &str, message: &str, demo: bool) -> ApiError {
    let subtype = api_error_subtype(code);
    ApiError {
        code: code.to_string(),
        original_message: message.to_string(),
        subtype,
        retryable: subtype == ApiErrorSubtype::RateLimit,
        demo,
        request_id: None,
        timestamp: Utc::now(),
    }
}

fn api_error_subtype(code: &str) -> ApiErrorSubtype {
    let upper = code.to_uppercase();
    if upper.starts_with("AUTH") {
        ApiErrorSubtype::Auth
    } else if upper.contains("RATE") || upper.contains("LIMIT") {
        ApiErrorSubtype::RateLimit
    } else if upper.contains("NOT_FOUND") || upper.contains("UNKNOWN_TORRENT") {
        ApiErrorSubtype::NotFound
    } else {
        ApiErrorSubtype::Unknown
    }
}

pub fn classify_validation_failure(issues: Vec<ValidationIssue>) -> ValidationError {
    ValidationError {
        issues,
        request_id: None,
        timestamp: Utc::now(),
    }
}

pub fn configuration_error(message: impl Into<String>) -> ConfigurationError {
    ConfigurationError {
        message: message.into(),
        timestamp: Utc::now(),
    }
}

/// Outcome of running the same operation over several inputs.
#[derive(Debug)]
pub struct BatchResult<T> {
    pub successes: Vec<T>,
    /// Failed inputs, keyed by their position in the original list.
    pub failures: Vec<(usize, SdkError)>,
}

impl<T> BatchResult<T> {
    pub fn from_results(results: impl IntoIterator<Item = Result<T>>) -> Self {
        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(value) => successes.push(value),
                Err(err) => failures.push((index, err)),
            }
        }
        BatchResult {
            successes,
            failures,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
