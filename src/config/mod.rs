//! Configuration types for the BMS Core SDK.
//!
//! This module provides the configuration object every request is built
//! from.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: Backend route, app GUID, region, default timeout and the
//!   registered authorization manager
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`AppRoute`]: A validated backend base URL
//! - [`AppGuid`]: A validated backend application GUID
//! - [`BluemixRegion`]: The region the backend is hosted in
//!
//! # Example
//!
//! ```rust
//! use bms_core::{AppGuid, AppRoute, BluemixRegion, ClientConfig};
//!
//! let config = ClientConfig::builder()
//!     .app_route(AppRoute::new("https://myapp.mybluemix.net").unwrap())
//!     .app_guid(AppGuid::new("my-app-guid").unwrap())
//!     .region(BluemixRegion::UsSouth)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.region_suffix(), Some("ng.bluemix.net"));
//! ```

mod newtypes;
mod region;

pub use newtypes::{AppGuid, AppRoute};
pub use region::BluemixRegion;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::auth::{AuthorizationManager, DefaultAuthorizationManager};
use crate::error::ConfigError;

/// Default timeout applied to requests that do not set their own.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Configuration shared by every request sent to the backend.
///
/// The route, GUID and region are fixed when the config is built. The
/// default request timeout and the registered [`AuthorizationManager`] can
/// be changed afterwards; both sit behind a lock so concurrent requests
/// never observe a partial update.
///
/// Build one config at startup and share it as `Arc<ClientConfig>`.
///
/// # Thread Safety
///
/// `ClientConfig` is `Send` and `Sync`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use bms_core::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .default_request_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.default_request_timeout(), Duration::from_secs(5));
/// assert!(config.app_route().is_none());
/// ```
#[derive(Debug)]
pub struct ClientConfig {
    app_route: Option<AppRoute>,
    app_guid: Option<AppGuid>,
    region: Option<BluemixRegion>,
    default_request_timeout: RwLock<Duration>,
    authorization_manager: RwLock<Option<Arc<dyn AuthorizationManager>>>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the backend base URL, if configured.
    #[must_use]
    pub const fn app_route(&self) -> Option<&AppRoute> {
        self.app_route.as_ref()
    }

    /// Returns the backend application GUID, if configured.
    #[must_use]
    pub const fn app_guid(&self) -> Option<&AppGuid> {
        self.app_guid.as_ref()
    }

    /// Returns the backend region, if configured.
    #[must_use]
    pub const fn region(&self) -> Option<BluemixRegion> {
        self.region
    }

    /// Returns the domain suffix of the configured region.
    #[must_use]
    pub fn region_suffix(&self) -> Option<&'static str> {
        self.region.map(|region| region.suffix())
    }

    /// Returns the timeout applied to newly built requests.
    #[must_use]
    pub fn default_request_timeout(&self) -> Duration {
        *self
            .default_request_timeout
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Changes the timeout applied to requests built from now on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] if `timeout` is zero.
    pub fn set_default_request_timeout(&self, timeout: Duration) -> Result<(), ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        *self
            .default_request_timeout
            .write()
            .unwrap_or_else(PoisonError::into_inner) = timeout;
        Ok(())
    }

    /// Returns the registered authorization manager, or a
    /// [`DefaultAuthorizationManager`] if none is registered.
    #[must_use]
    pub fn authorization_manager(&self) -> Arc<dyn AuthorizationManager> {
        self.authorization_manager
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultAuthorizationManager::new()))
    }

    /// Registers `manager`, replacing any previously registered one.
    ///
    /// Requests already built keep the manager they were built with.
    pub fn register_authorization_manager(&self, manager: Arc<dyn AuthorizationManager>) {
        *self
            .authorization_manager
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(manager);
    }

    /// Returns `true` if a custom authorization manager is registered.
    #[must_use]
    pub fn has_registered_authorization_manager(&self) -> bool {
        self.authorization_manager
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Every field is optional. The route and GUID are only needed by services
/// that talk to the backend application itself.
///
/// # Defaults
///
/// - `app_route`: `None`
/// - `app_guid`: `None`
/// - `region`: `None`
/// - `default_request_timeout`: 20 seconds
/// - `authorization_manager`: [`DefaultAuthorizationManager`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    app_route: Option<AppRoute>,
    app_guid: Option<AppGuid>,
    region: Option<BluemixRegion>,
    default_request_timeout: Option<Duration>,
    authorization_manager: Option<Arc<dyn AuthorizationManager>>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend base URL.
    #[must_use]
    pub fn app_route(mut self, route: AppRoute) -> Self {
        self.app_route = Some(route);
        self
    }

    /// Sets the backend application GUID.
    #[must_use]
    pub fn app_guid(mut self, guid: AppGuid) -> Self {
        self.app_guid = Some(guid);
        self
    }

    /// Sets the region the backend is hosted in.
    #[must_use]
    pub const fn region(mut self, region: BluemixRegion) -> Self {
        self.region = Some(region);
        self
    }

    /// Sets the default request timeout.
    #[must_use]
    pub const fn default_request_timeout(mut self, timeout: Duration) -> Self {
        self.default_request_timeout = Some(timeout);
        self
    }

    /// Registers an authorization manager up front.
    #[must_use]
    pub fn authorization_manager(mut self, manager: Arc<dyn AuthorizationManager>) -> Self {
        self.authorization_manager = Some(manager);
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] if the default request
    /// timeout is zero.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let timeout = self.default_request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(ClientConfig {
            app_route: self.app_route,
            app_guid: self.app_guid,
            region: self.region,
            default_request_timeout: RwLock::new(timeout),
            authorization_manager: RwLock::new(self.authorization_manager),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthorizationFuture, Identity, PersistencePolicy};
    use crate::clients::HttpResponse;

    #[derive(Debug)]
    struct AlwaysRequired;

    impl AuthorizationManager for AlwaysRequired {
        fn is_authorization_required(&self, _status: u16, _header: &str) -> bool {
            true
        }
        fn is_oauth_error(&self, _response: &HttpResponse) -> bool {
            false
        }
        fn cached_authorization_header(&self) -> Option<String> {
            Some("Custom abc".to_string())
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

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder().build().unwrap();

        assert!(config.app_route().is_none());
        assert!(config.app_guid().is_none());
        assert!(config.region().is_none());
        assert!(config.region_suffix().is_none());
        assert_eq!(config.default_request_timeout(), Duration::from_secs(20));
        assert!(!config.has_registered_authorization_manager());
    }

    #[test]
    fn test_builder_with_all_fields() {
        let config = ClientConfig::builder()
            .app_route(AppRoute::new("https://myapp.mybluemix.net").unwrap())
            .app_guid(AppGuid::new("guid-1").unwrap())
            .region(BluemixRegion::Sydney)
            .default_request_timeout(Duration::from_millis(1500))
            .build()
            .unwrap();

        assert_eq!(
            config.app_route().unwrap().host_name(),
            Some("myapp.mybluemix.net")
        );
        assert_eq!(config.app_guid().unwrap().as_ref(), "guid-1");
        assert_eq!(config.region(), Some(BluemixRegion::Sydney));
        assert_eq!(config.region_suffix(), Some("au-syd.bluemix.net"));
        assert_eq!(config.default_request_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = ClientConfig::builder()
            .default_request_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_default_timeout_can_be_changed() {
        let config = ClientConfig::builder().build().unwrap();

        config
            .set_default_request_timeout(Duration::from_secs(3))
            .unwrap();
        assert_eq!(config.default_request_timeout(), Duration::from_secs(3));

        assert!(matches!(
            config.set_default_request_timeout(Duration::ZERO),
            Err(ConfigError::InvalidTimeout)
        ));
        assert_eq!(config.default_request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_unregistered_manager_falls_back_to_default() {
        let config = ClientConfig::builder().build().unwrap();
        let manager = config.authorization_manager();
        assert!(manager.cached_authorization_header().is_none());
        assert!(!manager.is_authorization_required(401, "Bearer"));
    }

    #[test]
    fn test_register_replaces_manager() {
        let config = ClientConfig::builder().build().unwrap();
        config.register_authorization_manager(Arc::new(AlwaysRequired));

        assert!(config.has_registered_authorization_manager());
        let manager = config.authorization_manager();
        assert!(manager.is_authorization_required(200, ""));
        assert_eq!(
            manager.cached_authorization_header().as_deref(),
            Some("Custom abc")
        );

        config.register_authorization_manager(Arc::new(DefaultAuthorizationManager::new()));
        assert!(config.authorization_manager().cached_authorization_header().is_none());
    }

    #[test]
    fn test_builder_registers_manager() {
        let config = ClientConfig::builder()
            .authorization_manager(Arc::new(AlwaysRequired))
            .build()
            .unwrap();
        assert!(config.has_registered_authorization_manager());
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientConfig>();
    }

    #[test]
    fn test_config_is_debug() {
        let config = ClientConfig::builder().build().unwrap();
        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ClientConfig"));
    }
}
