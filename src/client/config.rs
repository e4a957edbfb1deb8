//! Client configuration.
//!
//! [`ClientOptions`] is what callers hand to
//! [`DebridClient::configure`](crate::client::DebridClient::configure);
//! validation turns it into an immutable [`ClientConfig`].

use crate::error::{configuration_error, Result};
use crate::protocol::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Unvalidated client options.
///
/// # Examples
///
/// ```
/// use alldebrid::client::ClientOptions;
///
/// let config = ClientOptions::new("my-api-key")
///     .with_base_url("https://api.alldebrid.com/")
///     .with_max_retries(5)
///     .validate()
///     .unwrap();
/// assert_eq!(config.base_url(), "https://api.alldebrid.com");
/// assert_eq!(config.max_retries(), 5);
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    pub api_key: String,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl ClientOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        ClientOptions {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = Some(retry_delay_ms);
        self
    }

    /// Check every option and apply defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API key is empty, the base URL
    /// is not an absolute http(s) URL, or the timeout or retry delay is zero.
    pub fn validate(self) -> Result<ClientConfig> {
        if self.api_key.trim().is_empty() {
            return Err(configuration_error("apiKey is required").into());
        }

        let base_url = match self.base_url.as_deref() {
            Some(raw) => parse_base_url(raw)?,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let timeout_ms = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        if timeout_ms == 0 {
            return Err(configuration_error("timeoutMillis must be a positive integer").into());
        }

        let retry_delay_ms = self.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS);
        if retry_delay_ms == 0 {
            return Err(configuration_error("retryDelayMillis must be a positive integer").into());
        }

        Ok(ClientConfig {
            api_key: self.api_key,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay_ms,
        })
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| configuration_error(format!("baseUrl '{raw}' is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(configuration_error(format!("baseUrl '{raw}' must be an http(s) URL")).into());
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Validated, immutable client configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl ClientConfig {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upper bound for a single attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay_ms(&self) -> u64 {
        self.retry_delay_ms
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}
