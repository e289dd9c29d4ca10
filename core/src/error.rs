//! Error types for the request pipeline.
//!
//! # Design
//! Every stage of `NetworkManager::execute` fails fast with one of these
//! variants and the orchestrator re-raises it unchanged after logging.
//! Codec and transport failures keep the original error boxed as their
//! `source()`, so callers can `downcast_ref` to the concrete type they
//! supplied.

use thiserror::Error;

/// Boxed error used for codec and transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors returned by the mapping, transport, validation and decoding stages.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The descriptor cannot form a valid URL.
    #[error("invalid URL for host '{host}': {reason}")]
    InvalidUrl { host: String, reason: String },

    /// The request produced after interception is not usable.
    #[error("the URL request is invalid: {reason}")]
    InvalidUrlRequest { reason: String },

    /// The transport returned something that is not an HTTP response.
    #[error("the URL response is invalid (status {status})")]
    InvalidUrlResponse { status: u16 },

    /// The server answered with a status outside `200..=299`.
    #[error("request failed with status code {0}")]
    HttpStatus(u16),

    /// A 2xx response other than 204/205 arrived without a body.
    #[error("the response has an empty body but status {status} does not allow it")]
    UnexpectedEmptyBody { status: u16 },

    /// The response body is not a well-formed JSON document.
    #[error("the body of the response is not in a valid JSON format: {reason}")]
    InvalidBodyFormat { reason: String },

    /// The body is empty and the target model cannot represent "no content".
    #[error("status {status} has no content but the response model requires a body")]
    InvalidEmptyResponseModel { status: u16 },

    /// No registered mock exchange matches the request.
    #[error("no mock exchange registered for {method} {url}")]
    MissingExchange { method: String, url: String },

    /// The matching mock exchange cannot produce HTTP response metadata.
    #[error("the mock exchange for {method} {url} is missing a response")]
    MissingResponse { method: String, url: String },

    /// The interceptor kept asking for retries past the configured bound.
    #[error("retry limit reached after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Network-level failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// Failure raised by a descriptor's encode or decode function.
    #[error("codec error: {0}")]
    Codec(#[source] BoxError),
}

impl NetworkError {
    /// The HTTP status this error is tied to, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::HttpStatus(status)
            | NetworkError::InvalidUrlResponse { status }
            | NetworkError::UnexpectedEmptyBody { status }
            | NetworkError::InvalidEmptyResponseModel { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error comes from the mock registry lookup.
    pub fn is_mock_miss(&self) -> bool {
        matches!(
            self,
            NetworkError::MissingExchange { .. } | NetworkError::MissingResponse { .. }
        )
    }

    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        NetworkError::Transport(err.into())
    }
}
