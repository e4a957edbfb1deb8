//! Transport abstraction.
//!
//! The client core never talks to the network directly; it hands each
//! [`RequestDescriptor`] to a [`Transport`]. [`ReqwestTransport`] is the
//! production implementation. Tests substitute a scripted transport to
//! count attempts and inject failures.
//!
//! A transport reports *completed* exchanges as [`TransportResponse`],
//! whatever their status, and only returns [`TransportError`] when no
//! response was obtained.

use crate::client::request::{FormPart, HttpMethod, RequestBody, RequestDescriptor};
use crate::error::{TransportError, TransportErrorKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::time::Duration;

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Response headers, keys lowercased.
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        TransportResponse {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes one HTTP attempt.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(
        &self,
        request: &RequestDescriptor,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
///
/// Connection pooling is left to reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("alldebrid-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        ReqwestTransport { client }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut req_builder = self
            .client
            .request(method, request.url.clone())
            .headers(request.headers.clone())
            .timeout(timeout);

        match &request.body {
            RequestBody::None => {}
            RequestBody::Json(value) => {
                let body = serde_json::to_vec(value).map_err(|e| {
                    TransportError::new(TransportErrorKind::Other, format!("cannot encode JSON body: {e}"))
                })?;
                req_builder = req_builder.body(body);
            }
            RequestBody::Multipart(form) => {
                let mut multipart = reqwest::multipart::Form::new();
                for part in form.parts() {
                    multipart = match part {
                        FormPart::Text { name, value } => multipart.text(name.clone(), value.clone()),
                        FormPart::File {
                            name,
                            file_name,
                            content,
                        } => multipart.part(
                            name.clone(),
                            reqwest::multipart::Part::bytes(content.to_vec()).file_name(file_name.clone()),
                        ),
                    };
                }
                req_builder = req_builder.multipart(multipart);
            }
        }

        let response = req_builder.send().await.map_err(|e| map_reqwest_error(&e))?;

        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_string(), val.to_string());
            }
        }

        let body = response.bytes().await.map_err(|e| map_reqwest_error(&e))?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Map a reqwest failure onto a [`TransportErrorKind`].
fn map_reqwest_error(error: &reqwest::Error) -> TransportError {
    let message = error_chain(error);
    let kind = if error.is_timeout() {
        TransportErrorKind::TimedOut
    } else if is_connection_reset(error) {
        TransportErrorKind::ConnectionReset
    } else if is_dns_failure(&message) {
        TransportErrorKind::NameNotResolved
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, message)
}

fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn is_connection_reset(error: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(error);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

fn is_dns_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("dns error")
        || lower.contains("failed to lookup address")
        || lower.contains("name or service not known")
        || lower.contains("no such host")
}
