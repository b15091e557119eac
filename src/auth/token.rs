//! Bearer token authorization.
//!
//! [`TokenAuthorizationManager`] caches a bearer token obtained from a
//! [`TokenSource`] and moves through the states described by
//! [`AuthorizationState`]:
//!
//! ```text
//! Unauthenticated -> Obtaining -> Cached -> Expired -> Obtaining -> ...
//! ```
//!
//! [`AuthorizationManager::clear_authorization_data`] returns the manager to
//! `Unauthenticated` from any state.
//!
//! When the token is a JWT its claims are decoded to expose identities and
//! the expiry. The signature is not verified; that is the server's job.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::auth::manager::{AuthorizationFuture, AuthorizationManager, Identity, PersistencePolicy};
use crate::clients::HttpResponse;

/// Scheme prefix used for the `Authorization` header value.
const BEARER_SCHEME: &str = "Bearer";

/// Produces bearer tokens for a [`TokenAuthorizationManager`].
///
/// Only [`fetch_token`](Self::fetch_token) is required. The persistence
/// hooks are called when the manager's policy is
/// [`PersistencePolicy::Always`] and default to doing nothing.
///
/// # Example
///
/// ```rust
/// use bms_core::auth::{AuthorizationFuture, TokenSource};
///
/// #[derive(Debug)]
/// struct FixedToken(&'static str);
///
/// impl TokenSource for FixedToken {
///     fn fetch_token(&self) -> AuthorizationFuture<'_, String> {
///         Box::pin(std::future::ready(Ok(self.0.to_string())))
///     }
/// }
/// ```
pub trait TokenSource: Send + Sync + fmt::Debug {
    /// Fetches a new token, possibly over the network.
    fn fetch_token(&self) -> AuthorizationFuture<'_, String>;

    /// Stores `token` so it can be restored after a restart.
    fn persist_token(&self, _token: &str) {}

    /// Returns a token stored by an earlier run, if any.
    fn restore_token(&self) -> Option<String> {
        None
    }

    /// Deletes any stored token.
    fn discard_persisted_token(&self) {}
}

/// Where a [`TokenAuthorizationManager`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthorizationState {
    /// No token has been obtained.
    Unauthenticated,
    /// A token request is in flight.
    Obtaining,
    /// A valid token is cached.
    Cached,
    /// The cached token passed its expiry.
    Expired,
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
    #[serde(rename = "imf.user")]
    user: Option<Identity>,
    #[serde(rename = "imf.device")]
    device: Option<Identity>,
    #[serde(rename = "imf.application")]
    application: Option<Identity>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    claims: TokenClaims,
    expires: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn new(value: String) -> Self {
        let claims = decode_claims(&value).unwrap_or_default();
        let expires = claims
            .exp
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single());
        Self {
            value,
            claims,
            expires,
        }
    }

    fn expired(&self) -> bool {
        self.expires.is_some_and(|expires| Utc::now() >= expires)
    }

    fn header_value(&self) -> String {
        format!("{BEARER_SCHEME} {}", self.value)
    }
}

#[derive(Debug)]
struct TokenState {
    state: AuthorizationState,
    token: Option<CachedToken>,
    policy: PersistencePolicy,
}

/// An [`AuthorizationManager`] that sends `Authorization: Bearer <token>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use bms_core::auth::{AuthorizationState, TokenAuthorizationManager};
///
/// let manager = Arc::new(TokenAuthorizationManager::new(MyTokenSource::default()));
/// config.register_authorization_manager(manager.clone());
///
/// manager.obtain_authorization_header().await?;
/// assert_eq!(manager.state(), AuthorizationState::Cached);
/// ```
pub struct TokenAuthorizationManager {
    source: Arc<dyn TokenSource>,
    inner: Mutex<TokenState>,
}

impl TokenAuthorizationManager {
    /// Creates an unauthenticated manager backed by `source`.
    #[must_use]
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Creates a manager backed by a shared token source.
    #[must_use]
    pub fn from_shared(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            inner: Mutex::new(TokenState {
                state: AuthorizationState::Unauthenticated,
                token: None,
                policy: PersistencePolicy::Never,
            }),
        }
    }

    /// Returns the current lifecycle state, marking an expired token.
    #[must_use]
    pub fn state(&self) -> AuthorizationState {
        let mut inner = self.lock();
        Self::refresh_expiry(&mut inner);
        inner.state
    }

    /// Returns when the cached token expires, if it carries an expiry.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.lock().token.as_ref().and_then(|token| token.expires)
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh_expiry(inner: &mut TokenState) {
        if inner.state == AuthorizationState::Cached
            && inner.token.as_ref().is_some_and(CachedToken::expired)
        {
            inner.state = AuthorizationState::Expired;
        }
    }

    fn restore_if_persisted(&self, inner: &mut TokenState) {
        if inner.state != AuthorizationState::Unauthenticated {
            return;
        }
        if let Some(value) = self.source.restore_token() {
            inner.token = Some(CachedToken::new(value));
            inner.state = AuthorizationState::Cached;
        }
    }

    fn identity(&self, select: fn(&TokenClaims) -> Option<&Identity>) -> Option<Identity> {
        self.lock()
            .token
            .as_ref()
            .and_then(|token| select(&token.claims).cloned())
    }
}

/// Settles the state of an obtain that was dropped before its fetch
/// resolved.
struct ObtainGuard<'a> {
    manager: &'a TokenAuthorizationManager,
    settled: bool,
}

impl Drop for ObtainGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.manager.lock();
        if inner.state != AuthorizationState::Obtaining {
            return;
        }
        let state = match &inner.token {
            Some(token) if token.expired() => AuthorizationState::Expired,
            Some(_) => AuthorizationState::Cached,
            None => AuthorizationState::Unauthenticated,
        };
        inner.state = state;
    }
}

impl fmt::Debug for TokenAuthorizationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("TokenAuthorizationManager")
            .field("source", &self.source)
            .field("state", &inner.state)
            .field("policy", &inner.policy)
            .finish_non_exhaustive()
    }
}

impl AuthorizationManager for TokenAuthorizationManager {
    fn is_authorization_required(&self, status_code: u16, authenticate_header: &str) -> bool {
        matches!(status_code, 401 | 403) && names_scheme(authenticate_header, BEARER_SCHEME)
    }

    fn is_oauth_error(&self, response: &HttpResponse) -> bool {
        self.is_authorization_required_for_response(response)
            && response
                .header("www-authenticate")
                .is_some_and(|value| value.contains("invalid_token"))
    }

    fn cached_authorization_header(&self) -> Option<String> {
        let mut inner = self.lock();
        if inner.policy == PersistencePolicy::Never {
            return None;
        }
        self.restore_if_persisted(&mut inner);
        Self::refresh_expiry(&mut inner);
        if inner.state != AuthorizationState::Cached {
            return None;
        }
        inner.token.as_ref().map(CachedToken::header_value)
    }

    fn obtain_authorization_header(&self) -> AuthorizationFuture<'_, Option<String>> {
        Box::pin(async move {
            self.lock().state = AuthorizationState::Obtaining;
            let mut guard = ObtainGuard {
                manager: self,
                settled: false,
            };

            let fetched = self.source.fetch_token().await;
            guard.settled = true;

            match fetched {
                Ok(value) => {
                    let token = CachedToken::new(value);
                    let header = token.header_value();
                    let mut inner = self.lock();
                    if inner.policy == PersistencePolicy::Always {
                        self.source.persist_token(&token.value);
                    }
                    inner.token = Some(token);
                    inner.state = AuthorizationState::Cached;
                    Ok(Some(header))
                }
                Err(err) => {
                    let mut inner = self.lock();
                    inner.token = None;
                    inner.state = AuthorizationState::Unauthenticated;
                    Err(err)
                }
            }
        })
    }

    fn clear_authorization_data(&self) {
        let mut inner = self.lock();
        inner.token = None;
        inner.state = AuthorizationState::Unauthenticated;
        if inner.policy == PersistencePolicy::Always {
            self.source.discard_persisted_token();
        }
    }

    fn user_identity(&self) -> Option<Identity> {
        self.identity(|claims| claims.user.as_ref())
    }

    fn device_identity(&self) -> Option<Identity> {
        self.identity(|claims| claims.device.as_ref())
    }

    fn app_identity(&self) -> Option<Identity> {
        self.identity(|claims| claims.application.as_ref())
    }

    fn authorization_persistence_policy(&self) -> PersistencePolicy {
        self.lock().policy
    }

    fn set_authorization_persistence_policy(&self, policy: PersistencePolicy) {
        self.lock().policy = policy;
    }
}

// Verify TokenAuthorizationManager is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenAuthorizationManager>();
};

/// Decodes JWT claims without verifying the signature.
///
/// Returns `None` for opaque (non-JWT) tokens.
/// Returns `true` if one of the challenges in a `WWW-Authenticate` value
/// uses `scheme`.
fn names_scheme(authenticate_header: &str, scheme: &str) -> bool {
    authenticate_header
        .split(',')
        .filter_map(|challenge| challenge.split_whitespace().next())
        .any(|token| token.eq_ignore_ascii_case(scheme))
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(err) => {
            tracing::debug!("Authorization token is not a decodable JWT: {err}");
            None
        }
    }
}
