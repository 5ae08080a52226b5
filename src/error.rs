//! Error types for the CPBM SDK.
//!
//! All SDK operations return a single unified error type so callers can
//! distinguish configuration mistakes, transport failures, API rejections
//! and malformed responses without string matching.

use thiserror::Error;

/// Result type for CPBM operations.
pub type Result<T> = std::result::Result<T, CpbmError>;

/// Errors that can occur when using the CPBM SDK.
#[derive(Error, Debug)]
pub enum CpbmError {
    /// Missing or invalid client configuration (empty API key, bad config file).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network-level failure: connect, DNS, timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server responded with a non-success status. The raw body is
    /// preserved verbatim so nothing the server said is lost.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// The server responded 2xx but the body was not valid JSON.
    #[error("decode error: {message}")]
    Decode {
        /// Description of the JSON parse failure.
        message: String,
        /// The body that failed to decode.
        body: String,
    },
}

impl CpbmError {
    /// Returns true if this is a retryable error.
    ///
    /// The SDK never retries on its own; this is a hint for caller-supplied
    /// retry wrappers.
    pub fn is_retryable(&self) -> bool {
        match self {
            CpbmError::Transport(_) => true,
            CpbmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the HTTP status code if the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CpbmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
