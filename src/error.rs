//! Error types for the Vultr client.

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, VultrError>;

/// Errors raised by the request builders and the transport gateway.
#[derive(Debug, Error)]
pub enum VultrError {
    /// Raised by a request builder before any network call is made.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Raised when the API answers with a non-success status.
    #[error("API request failed with HTTP {status}: {message}")]
    Request {
        /// HTTP status code returned by the API.
        status: u16,
        /// Decoded `error` field, or the raw body when there is none.
        message: String,
    },
    /// Raised when no response was received at all.
    #[error("an unknown error occurred while performing the request to {url}: {message}")]
    Transport {
        /// URL of the failed request.
        url: String,
        /// Underlying transport failure.
        message: String,
    },
    /// Raised when a response body is not valid JSON.
    #[error("failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),
    /// Raised when a response decodes but lacks an expected field.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// Raised when the HTTP client or base URL cannot be constructed.
    #[error("client error: {0}")]
    Client(String),
}

impl VultrError {
    /// Shorthand for [`VultrError::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// HTTP status attached to the error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for errors raised before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}
