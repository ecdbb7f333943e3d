//! Error types for the catalog API client.
//!
//! # Design
//! A remote API error (`Remote`) is kept apart from a body that fits no known
//! schema (`MalformedResponse`): the former is a well-formed answer the caller
//! can act on, the latter means the exchange itself is unusable. Network
//! failures get their own variant instead of borrowing an HTTP status.

use thiserror::Error;

use crate::response::ErrorResponse;

/// Result alias used across the client.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `CatalogClient` and the operation builders.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Endpoint, credential or HTTP client setup is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An operation builder precondition was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The exchange failed before any server response arrived.
    #[error("no response from server: {0}")]
    NoResponse(String),

    /// The remote API answered with its error document.
    #[error("remote API error (HTTP {status}): {error}")]
    Remote { status: u16, error: ErrorResponse },

    /// The body parsed as neither the success nor the error schema.
    #[error("malformed response (HTTP {status}): {reason}")]
    MalformedResponse { status: u16, reason: String },
}

impl ApiError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
