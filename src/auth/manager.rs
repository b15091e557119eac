//! The authorization hook consulted by every request.
//!
//! This module provides the [`AuthorizationManager`] trait and the
//! [`DefaultAuthorizationManager`] used when no manager is registered.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::auth::AuthorizationError;
use crate::clients::{HttpRequest, HttpResponse};

/// Name of the header set by [`AuthorizationManager::add_cached_authorization_header`].
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Identity claims decoded from a previously obtained token.
pub type Identity = serde_json::Value;

/// Boxed future returned by authorization operations.
pub type AuthorizationFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, AuthorizationError>> + Send + 'a>>;

/// Whether an obtained authorization header survives process restarts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PersistencePolicy {
    /// Headers are not reused. Every challenge obtains a fresh one.
    #[default]
    Never,
    /// Headers are cached, persisted and restored on the next run.
    Always,
}

/// Capability interface for attaching authorization to outbound requests.
///
/// A manager is registered once on a
/// [`ClientConfig`](crate::config::ClientConfig) and shared by every request
/// built from it, so all methods take `&self`. Implementations use interior
/// mutability for their cached state.
///
/// # Example
///
/// ```rust
/// use bms_core::auth::{AuthorizationManager, DefaultAuthorizationManager};
///
/// let manager = DefaultAuthorizationManager::new();
/// assert!(!manager.is_authorization_required(401, "Bearer"));
/// assert!(manager.cached_authorization_header().is_none());
/// ```
pub trait AuthorizationManager: Send + Sync + fmt::Debug {
    /// Returns `true` if a response with this status and `WWW-Authenticate`
    /// value means the caller should (re)authorize before retrying.
    fn is_authorization_required(&self, status_code: u16, authenticate_header: &str) -> bool;

    /// Response-based form of [`is_authorization_required`](Self::is_authorization_required).
    fn is_authorization_required_for_response(&self, response: &HttpResponse) -> bool {
        let authenticate_header = response.header("www-authenticate").unwrap_or_default();
        self.is_authorization_required(response.status_code, authenticate_header)
    }

    /// Returns `true` if the response is an error specific to this
    /// manager's authorization scheme.
    fn is_oauth_error(&self, response: &HttpResponse) -> bool;

    /// Returns a previously obtained header value without network I/O.
    ///
    /// Absent if nothing is cached or the policy is
    /// [`PersistencePolicy::Never`].
    fn cached_authorization_header(&self) -> Option<String>;

    /// Sets the cached header, if any, on `request`.
    fn add_cached_authorization_header(&self, request: &mut HttpRequest) {
        if let Some(header) = self.cached_authorization_header() {
            request.set_header(AUTHORIZATION_HEADER, header);
        }
    }

    /// Obtains a fresh header value, possibly over the network.
    ///
    /// Resolves to `Ok(None)` when no authorization is available and that
    /// is not an error.
    fn obtain_authorization_header(&self) -> AuthorizationFuture<'_, Option<String>>;

    /// Discards any cached header and identity state.
    fn clear_authorization_data(&self);

    /// Returns the user identity from the last obtained token.
    fn user_identity(&self) -> Option<Identity>;

    /// Returns the device identity from the last obtained token.
    fn device_identity(&self) -> Option<Identity>;

    /// Returns the application identity from the last obtained token.
    fn app_identity(&self) -> Option<Identity>;

    /// Returns the current persistence policy.
    fn authorization_persistence_policy(&self) -> PersistencePolicy;

    /// Changes the persistence policy.
    fn set_authorization_persistence_policy(&self, policy: PersistencePolicy);
}

/// The manager used when none is registered. Every operation is a no-op.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAuthorizationManager;

impl DefaultAuthorizationManager {
    /// Creates the no-op manager.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuthorizationManager for DefaultAuthorizationManager {
    fn is_authorization_required(&self, _status_code: u16, _authenticate_header: &str) -> bool {
        false
    }

    fn is_oauth_error(&self, _response: &HttpResponse) -> bool {
        false
    }

    fn cached_authorization_header(&self) -> Option<String> {
        None
    }

    fn obtain_authorization_header(&self) -> AuthorizationFuture<'_, Option<String>> {
        Box::pin(std::future::ready(Ok(None)))
    }

    fn clear_authorization_data(&self) {}

    fn user_identity(&self) -> Option<Identity> {
        None
    }

    fn device_identity(&self) -> Option<Identity> {
        None
    }

    fn app_identity(&self) -> Option<Identity> {
        None
    }

    fn authorization_persistence_policy(&self) -> PersistencePolicy {
        PersistencePolicy::Never
    }

    fn set_authorization_persistence_policy(&self, _policy: PersistencePolicy) {}
}
