//! Authorization error types for the BMS Core SDK.
//!
//! This module contains the error type returned by
//! [`AuthorizationManager::obtain_authorization_header`](crate::auth::AuthorizationManager::obtain_authorization_header).
//!
//! # Example
//!
//! ```rust
//! use bms_core::auth::AuthorizationError;
//!
//! let error = AuthorizationError::TokenRejected {
//!     status: 401,
//!     message: "invalid client".to_string(),
//! };
//! assert!(error.to_string().contains("401"));
//! ```

use crate::clients::HttpError;
use thiserror::Error;

/// Errors that can occur while obtaining an authorization header.
///
/// These errors are advisory for a send: a request whose re-authorization
/// fails still completes with the last response it received.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// The token source could not produce a token.
    #[error("Could not obtain authorization: {reason}")]
    ObtainFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The authorization server answered with a non-success status.
    #[error("Authorization server rejected the request with status {status}: {message}")]
    TokenRejected {
        /// The HTTP status code returned.
        status: u16,
        /// The error message from the response.
        message: String,
    },

    /// Wrapped HTTP client error from a token request.
    #[error(transparent)]
    Http(#[from] HttpError),
}

// Verify AuthorizationError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthorizationError>();
};
