#![doc = include_str!("../README.md")]

//! # AllDebrid: typed client for the AllDebrid REST API
//!
//! Every call goes through one HTTP core that authenticates, retries
//! transport failures with exponential backoff, and validates the response
//! envelope before handing typed data back to the caller.
//!
//! ## Overview
//!
//! The crate is organized in layers:
//!
//! 1. **Errors** - A closed taxonomy: network, API, validation, configuration
//! 2. **Protocol** - The `{"status": ..., "data" | "error": ..., "demo"?}` envelope
//! 3. **Client** - Configuration, request building, transport and retry
//! 4. **Resources** - Typed callers for hosts, users, links and magnets
//!
//! ## Client Usage
//!
//! ```ignore
//! use alldebrid::client::{ClientOptions, DebridClient, RequestOptions};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DebridClient::new();
//!     client.configure(ClientOptions::new("my-api-key").with_max_retries(2))?;
//!
//!     let response = client.get::<Value>("v4/user", RequestOptions::new()).await?;
//!     println!("{}", response.data);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```ignore
//! use alldebrid::error::{ApiErrorSubtype, SdkError};
//!
//! match api.magnets().get(42).await {
//!     Ok(magnet) => println!("{:?}", magnet.state()),
//!     Err(SdkError::Api(e)) if e.subtype == ApiErrorSubtype::NotFound => println!("gone"),
//!     Err(e) if e.is_retryable() => println!("try again later: {e}"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[error]** - Error types and result handling
//! - **[protocol]** - Envelope parsing and protocol constants
//! - **[client]** - HTTP client core
//! - **[resources]** - Typed endpoint callers

pub mod client;
pub mod error;
pub mod protocol;
pub mod resources;

pub use client::{ClientOptions, DebridClient, RequestOptions};
pub use error::{ErrorKind, Result, SdkError};
pub use protocol::{parse_envelope, SuccessEnvelope};
pub use resources::AllDebrid;

#[cfg(test)]
mod tests;
