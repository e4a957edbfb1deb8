//! Request options and the per-call request descriptor.
//!
//! Callers describe a request with [`RequestOptions`]; the client turns it
//! into a [`RequestDescriptor`] once per logical call. The descriptor is
//! never mutated afterwards and is resent unchanged on every retry.
//!
//! # Body modes
//!
//! | Mode | Content-Type |
//! |------|--------------|
//! | [`RequestBody::None`] | not set |
//! | [`RequestBody::Json`] | `application/json` |
//! | [`RequestBody::Multipart`] | `multipart/form-data; boundary=...` (set by the transport) |
//!
//! # Examples
//!
//! ```
//! use alldebrid::client::{FormData, RequestOptions};
//!
//! let options = RequestOptions::new()
//!     .with_query("id", 42)
//!     .with_form(FormData::new().text("status", "ready"));
//! assert!(!options.is_public());
//! ```

use crate::client::config::ClientConfig;
use crate::client::utils::{join_url, normalize_path};
use crate::error::{configuration_error, Result};
use crate::protocol::constants::headers::{APPLICATION_JSON, BEARER_PREFIX};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::HeaderMap;
use serde_json::Value;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

/// HTTP methods the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content: Bytes,
    },
}

impl FormPart {
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// Multipart form fields and files.
///
/// Kept as plain data so the same form can be re-encoded on every retry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append one `name[]` field per value.
    pub fn text_list<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let field = format!("{name}[]");
        for value in values {
            self = self.text(field.clone(), value);
        }
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content: content.into(),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    None,
    /// Serialized as a JSON object.
    Json(Value),
    Multipart(FormData),
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    body: RequestBody,
    public: bool,
    cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; caller headers override the client defaults.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_form(mut self, form: FormData) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Mark the endpoint as public: no `Authorization` header is sent.
    pub fn public_endpoint(mut self) -> Self {
        self.public = true;
        self
    }

    /// Abort the call (including a pending backoff wait) when `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub(crate) fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }
}

/// A fully resolved request, built once per logical call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    /// Path with leading slashes stripped.
    pub path: String,
    /// Base URL, path and query parameters.
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// Resolve `options` against `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty path, a GET with a body, a
    /// non-object JSON body, or a header that is not valid HTTP.
    pub fn build(
        config: &ClientConfig,
        method: HttpMethod,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Self> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Err(configuration_error("path is required").into());
        }

        if method == HttpMethod::Get && options.body != RequestBody::None {
            return Err(configuration_error("GET requests cannot carry a body").into());
        }
        if let RequestBody::Json(value) = &options.body {
            if !value.is_object() {
                return Err(configuration_error("JSON request bodies must be objects").into());
            }
        }

        let mut url = join_url(config.base_url(), path)?;
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(options.query.iter());
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if !options.public {
            let mut auth = header_value(&format!("{BEARER_PREFIX}{}", config.api_key()))?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }
        if matches!(options.body, RequestBody::Json(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| configuration_error(format!("invalid header name '{name}': {e}")))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(RequestDescriptor {
            method,
            path: path.to_string(),
            url,
            headers,
            body: options.body.clone(),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| configuration_error(format!("invalid header value: {e}")).into())
}
