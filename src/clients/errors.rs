//! HTTP-specific error types for the BMS Core SDK.
//!
//! This module contains error types for request construction, body encoding,
//! and transport failures.
//!
//! # Error Handling
//!
//! The SDK uses specific error types for different failure scenarios:
//!
//! - [`UrlConstructionError`]: Query parameters could not be merged into a URL
//! - [`BodyEncodingError`]: A request body could not be encoded to bytes
//! - [`InvalidHttpRequestError`]: A request failed validation before sending
//! - [`TransportError`]: The network exchange itself failed
//! - [`HttpError`]: Unified error type returned by a send
//!
//! # Example
//!
//! ```rust,ignore
//! use bms_core::clients::{HttpError, TransportError};
//!
//! match request.send().await {
//!     Ok(response) => println!("Status: {}", response.status_code),
//!     Err(HttpError::Transport(TransportError::Timeout(e))) => {
//!         println!("Timed out: {}", e);
//!     }
//!     Err(e) => println!("Request failed: {}", e),
//! }
//! ```

use thiserror::Error;

/// Error returned when query parameters cannot be merged into a URL.
///
/// Only surfaced when the request builder is in strict mode. In the default
/// mode the original URL is used unchanged and a warning is logged.
///
/// # Example
///
/// ```rust
/// use bms_core::clients::UrlConstructionError;
///
/// let error = UrlConstructionError {
///     url: "mailto:someone@example.com".to_string(),
///     reason: "URL cannot carry a query component".to_string(),
/// };
///
/// assert!(error.to_string().contains("mailto:someone@example.com"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Could not append query parameters to '{url}': {reason}")]
pub struct UrlConstructionError {
    /// The URL the parameters were being appended to.
    pub url: String,
    /// Why the new URL could not be produced.
    pub reason: String,
}

/// Error returned when a request body cannot be encoded to bytes.
///
/// The request is left untouched when this error is returned: neither the
/// body nor the `Content-Type` header changes.
#[derive(Debug, Error)]
pub enum BodyEncodingError {
    /// The structured value could not be serialized to JSON.
    #[error("Could not encode request body as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned when an HTTP request fails validation.
///
/// Raised while building a request, before anything is sent.
///
/// # Example
///
/// ```rust
/// use bms_core::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::InvalidMethod {
///     method: "FETCH".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Invalid Http method FETCH.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// The HTTP method is not one of the supported methods.
    #[error("Invalid Http method {method}.")]
    InvalidMethod {
        /// The invalid method that was provided.
        method: String,
    },

    /// The resource URL could not be parsed as an absolute URL.
    #[error("Invalid resource URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL that was provided.
        url: String,
        /// The parser's explanation.
        reason: String,
    },

    /// Query parameters could not be appended (strict mode only).
    #[error(transparent)]
    UrlConstruction(#[from] UrlConstructionError),

    /// The request timeout must be a positive duration.
    #[error("Request timeout must be greater than zero.")]
    InvalidTimeout,

    /// A header name or value cannot be sent over the wire.
    #[error("Invalid header '{name}'.")]
    InvalidHeader {
        /// The offending header name.
        name: String,
    },
}

/// Network-level failure of a request.
///
/// Covers DNS failures, refused connections, TLS failures, timeouts, and
/// cancellation of an in-flight request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within its timeout.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// A connection could not be established (DNS, refused, TLS).
    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// The request was cancelled before it completed.
    #[error("Request was cancelled.")]
    Cancelled,

    /// A background send was started outside a Tokio runtime.
    #[error("No Tokio runtime is available to run the request.")]
    NoRuntime,

    /// The underlying HTTP client could not be created.
    #[error("Could not create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Any other failure while sending or reading the response.
    #[error("Network error: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else if error.is_connect() {
            Self::Connect(error)
        } else {
            Self::Request(error)
        }
    }
}

/// Unified error type for sending a request.
///
/// # Example
///
/// ```rust,ignore
/// use bms_core::HttpError;
///
/// match request.send().await {
///     Ok(response) => { /* handle response */ }
///     Err(HttpError::InvalidRequest(e)) => { /* handle validation error */ }
///     Err(HttpError::Transport(e)) => { /* handle network error */ }
/// }
/// ```
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.into())
    }
}

impl HttpError {
    /// Returns `true` if this error was caused by cancelling the request.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Cancelled))
    }
}
