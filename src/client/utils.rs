//! Utility functions for the AllDebrid HTTP client.
//!
//! This module provides helper functions for:
//! - Path normalization and URL joining
//! - Retry backoff calculation
//! - Status code classification

use crate::error::{configuration_error, Result};
use std::time::Duration;
use url::Url;

/// Strip leading slashes from a request path.
///
/// # Examples
///
/// ```
/// use alldebrid::client::normalize_path;
///
/// assert_eq!(normalize_path("/v4/user"), "v4/user");
/// assert_eq!(normalize_path("///v4/user"), "v4/user");
/// assert_eq!(normalize_path("v4/user"), "v4/user");
/// ```
pub fn normalize_path(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// Join a base URL and a normalized path with exactly one `/`.
pub fn join_url(base_url: &str, path: &str) -> Result<Url> {
    let joined = format!("{}/{}", base_url.trim_end_matches('/'), normalize_path(path));
    Url::parse(&joined)
        .map_err(|e| configuration_error(format!("cannot build request URL '{joined}': {e}")).into())
}

/// Statuses treated as transport failures rather than envelope responses.
pub fn is_transport_failure_status(status: u16) -> bool {
    status >= 500 || status == 429
}

pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Exponential backoff delay calculation
///
/// Returns `2^attempt * base_ms`; `attempt` is 0-indexed.
///
/// # Examples
///
/// ```
/// use alldebrid::client::exponential_backoff;
/// use std::time::Duration;
///
/// assert_eq!(exponential_backoff(0, 1000), Duration::from_millis(1000));
/// assert_eq!(exponential_backoff(2, 1000), Duration::from_millis(4000));
/// ```
pub fn exponential_backoff(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = 2_u64.saturating_pow(attempt).saturating_mul(base_ms);
    Duration::from_millis(delay_ms)
}
