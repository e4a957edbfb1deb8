//! AllDebrid wire protocol: constants and the response envelope.
//!
//! Every response body the API sends is wrapped in the same envelope:
//!
//! ```text
//! success: {"status":"success","data":<any>,"demo"?:true|false|"true"}
//! error:   {"status":"error","error":{"code":string,"message":string},"demo"?:true|false|"true"}
//! ```
//!
//! [`parse_envelope`] validates a decoded body against that shape and the
//! caller's expected `data` type.

pub mod envelope;

pub use envelope::{describe_json, normalize_demo, parse_envelope, Envelope, ErrorBody, SuccessEnvelope};

/// Protocol constants.
pub mod constants {
    /// Known API origin used when no base URL is configured.
    pub const DEFAULT_BASE_URL: &str = "https://api.alldebrid.com";

    /// Per-attempt timeout in milliseconds.
    pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Base of the exponential backoff: attempt `n` waits `2^n * base`.
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

    /// Values of the envelope `status` discriminant.
    pub mod status {
        pub const SUCCESS: &str = "success";
        pub const ERROR: &str = "error";
    }

    /// Header values the client sends.
    pub mod headers {
        pub const APPLICATION_JSON: &str = "application/json";
        pub const BEARER_PREFIX: &str = "Bearer ";
    }
}
