//! Main AllDebrid HTTP client implementation.
//!
//! [`DebridClient`] is the single point of outbound communication. It owns
//! authentication, request construction, retry and envelope decoding.
//!
//! # Examples
//!
//! ## Simple GET request
//!
//! ```ignore
//! use alldebrid::client::{ClientOptions, DebridClient, RequestOptions};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DebridClient::new();
//!     client.configure(ClientOptions::new("my-api-key"))?;
//!     let response = client.get::<Value>("v4/user", RequestOptions::new()).await?;
//!     println!("demo: {}, data: {}", response.demo, response.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Multipart POST
//!
//! ```ignore
//! use alldebrid::client::{FormData, RequestOptions};
//!
//! let form = FormData::new().text_list("magnets", ["magnet:?xt=urn:btih:..."]);
//! let response = client
//!     .post::<serde_json::Value>("v4/magnet/upload", RequestOptions::new().with_form(form))
//!     .await?;
//! ```
//!
//! # Retry policy
//!
//! Only transport failures are retried: connection resets, timeouts, DNS
//! failures, and 5xx/429 statuses. Attempt `n` (0-indexed) waits
//! `2^n * retry_delay_ms` before the next one, up to `max_retries` retries.
//! Error envelopes and validation failures are returned on the first
//! attempt, even rate-limit errors.

use crate::client::config::{ClientConfig, ClientOptions};
use crate::client::request::{HttpMethod, RequestDescriptor, RequestOptions};
use crate::client::transport::{ReqwestTransport, Transport, TransportResponse};
use crate::client::utils::{exponential_backoff, is_success_status, is_transport_failure_status};
use crate::error::{
    classify_network_failure, classify_validation_failure, configuration_error, NetworkError,
    Result, SdkError, TransportError, ValidationIssue,
};
use crate::protocol::{parse_envelope, SuccessEnvelope};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn, Instrument};
use uuid::Uuid;

/// The AllDebrid HTTP client
///
/// Cheap to clone; clones share the transport and the configuration.
///
/// # Features
///
/// - Bearer authentication, skipped for public endpoints
/// - Automatic retry with exponential backoff for transport failures
/// - Envelope validation into typed data
/// - Cancellation of in-flight calls
#[derive(Clone)]
pub struct DebridClient {
    transport: Arc<dyn Transport>,
    config: Arc<RwLock<Option<Arc<ClientConfig>>>>,
}

impl DebridClient {
    /// Create an unconfigured client backed by reqwest.
    ///
    /// Every call fails with a configuration error until
    /// [`configure`](Self::configure) succeeds.
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Create an unconfigured client using a custom transport.
    pub fn with_transport(transport: impl Transport) -> Self {
        DebridClient {
            transport: Arc::new(transport),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Create and configure a reqwest-backed client in one step.
    pub fn with_options(options: ClientOptions) -> Result<Self> {
        let client = Self::new();
        client.configure(options)?;
        Ok(client)
    }

    /// Validate and store the configuration used by all subsequent calls.
    ///
    /// May be called again to reconfigure; the last call wins. Calls already
    /// in flight keep the configuration they started with.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid options; the previous
    /// configuration (if any) is kept in that case.
    pub fn configure(&self, options: ClientOptions) -> Result<()> {
        let config = options.validate()?;
        debug!(?config, "alldebrid client configured");
        *self.config.write() = Some(Arc::new(config));
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.config.read().is_some()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Option<Arc<ClientConfig>> {
        self.config.read().clone()
    }

    /// GET `path` and decode the envelope's `data` as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<SuccessEnvelope<T>> {
        self.request(HttpMethod::Get, path, options).await
    }

    /// POST `path` with the body mode carried by `options`.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<SuccessEnvelope<T>> {
        self.request(HttpMethod::Post, path, options).await
    }

    /// Perform one logical call: build, send with retries, decode.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<SuccessEnvelope<T>> {
        let config = self.config().ok_or_else(|| {
            SdkError::from(configuration_error(
                "client is not configured; call configure() with an API key first",
            ))
        })?;
        let descriptor = RequestDescriptor::build(&config, method, path, &options)?;

        let request_id = Uuid::new_v4().to_string();
        let span = tracing::debug_span!(
            "alldebrid_request",
            request_id = %request_id,
            method = %descriptor.method,
            path = %descriptor.path,
        );

        async {
            let response = self
                .send_with_retries(&config, &descriptor, options.cancellation())
                .await
                .map_err(SdkError::from)?;
            decode_response(response)
        }
        .instrument(span)
        .await
        .map_err(|e| e.with_request_id(&request_id))
    }

    /// Send `descriptor`, retrying transport failures with backoff.
    async fn send_with_retries(
        &self,
        config: &ClientConfig,
        descriptor: &RequestDescriptor,
        cancel: Option<&CancellationToken>,
    ) -> std::result::Result<TransportResponse, NetworkError> {
        let mut attempt: u32 = 0;
        loop {
            match self.send_once(config, descriptor, cancel).await {
                Ok(response) => return Ok(response),
                Err(e) if e.retryable && attempt < config.max_retries() => {
                    let delay = exponential_backoff(attempt, config.retry_delay_ms());
                    warn!(
                        "Request failed (attempt {}), retrying after {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    match cancel {
                        Some(token) => {
                            tokio::select! {
                                biased;
                                _ = token.cancelled() => return Err(aborted()),
                                _ = sleep(delay) => {}
                            }
                        }
                        None => sleep(delay).await,
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One attempt, bounded by the configured timeout.
    async fn send_once(
        &self,
        config: &ClientConfig,
        descriptor: &RequestDescriptor,
        cancel: Option<&CancellationToken>,
    ) -> std::result::Result<TransportResponse, NetworkError> {
        let timeout = config.timeout();
        debug!(url = %descriptor.url, "alldebrid http request");

        let attempt = tokio::time::timeout(timeout, self.transport.send(descriptor, timeout));
        let outcome = match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(aborted()),
                    outcome = attempt => outcome,
                }
            }
            None => attempt.await,
        };

        let response = match outcome {
            Err(_elapsed) => return Err(classify_network_failure(TransportError::timed_out(timeout), None)),
            Ok(Err(cause)) => return Err(classify_network_failure(cause, None)),
            Ok(Ok(response)) => response,
        };

        debug!(status = response.status, body = %response.text(), "alldebrid http raw response");

        if is_transport_failure_status(response.status) {
            let cause = TransportError::status(response.status, &response.text());
            return Err(classify_network_failure(cause, Some(response.status)));
        }
        Ok(response)
    }
}

impl Default for DebridClient {
    fn default() -> Self {
        Self::new()
    }
}

fn aborted() -> NetworkError {
    classify_network_failure(TransportError::aborted(), None)
}

/// Decode a completed exchange into the caller's data type.
///
/// Error envelopes are honored whatever the status. A non-2xx response
/// that is not an error envelope is reported as a (non-retryable)
/// network error carrying the status.
fn decode_response<T: DeserializeOwned>(response: TransportResponse) -> Result<SuccessEnvelope<T>> {
    let status = response.status;
    let status_error = || -> SdkError {
        classify_network_failure(TransportError::status(status, &response.text()), Some(status)).into()
    };

    let json: Value = match serde_json::from_slice(&response.body) {
        Ok(json) => json,
        Err(_) if !is_success_status(status) => return Err(status_error()),
        Err(e) => {
            let issue = ValidationIssue::new("<body>", format!("response body is not valid JSON: {e}"));
            return Err(classify_validation_failure(vec![issue]).into());
        }
    };

    match parse_envelope(json) {
        Err(SdkError::Validation(_)) if !is_success_status(status) => Err(status_error()),
        other => other,
    }
}
