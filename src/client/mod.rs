//! AllDebrid HTTP client implementation.
//!
//! This module provides the HTTP core every resource call goes through. It
//! takes care of:
//!
//! - **Authentication** with a bearer API key (skipped for public endpoints)
//! - **Request construction** from a path, query, headers and a body mode
//! - **Automatic retry** of transport failures with exponential backoff
//! - **Envelope decoding** into typed data or a classified [`SdkError`]
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch     - DebridClient and the retry loop
//! ├── config    - Client options and validated configuration
//! ├── request   - Request options, body modes and descriptors
//! ├── transport - Transport trait and the reqwest implementation
//! └── utils     - Utility functions
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DebridClient`] | Main HTTP client |
//! | [`ClientOptions`] | Unvalidated configuration input |
//! | [`ClientConfig`] | Validated, immutable configuration |
//! | [`RequestOptions`] | Per-call headers, query, body and cancellation |
//! | [`Transport`] | Seam for the network layer |
//!
//! # Examples
//!
//! ## Creating a Client
//!
//! ```
//! use alldebrid::client::{ClientOptions, DebridClient};
//!
//! let client = DebridClient::new();
//! assert!(!client.is_configured());
//!
//! client
//!     .configure(ClientOptions::new("my-api-key").with_max_retries(5))
//!     .unwrap();
//! assert_eq!(client.config().unwrap().max_retries(), 5);
//! ```
//!
//! ## Utility Functions
//!
//! ```
//! use alldebrid::client::{exponential_backoff, is_transport_failure_status};
//! use std::time::Duration;
//!
//! assert!(is_transport_failure_status(503));
//! assert!(!is_transport_failure_status(404));
//!
//! let delay = exponential_backoff(2, 100);
//! assert_eq!(delay, Duration::from_millis(400));
//! ```
//!
//! [`SdkError`]: crate::error::SdkError

mod config;
mod fetch;
mod request;
mod transport;
mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ClientConfig, ClientOptions};
pub use fetch::DebridClient;
pub use request::{FormData, FormPart, HttpMethod, RequestBody, RequestDescriptor, RequestOptions};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
pub use utils::*;
