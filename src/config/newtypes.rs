//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use reqwest::Url;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated base URL of the backend application.
///
/// The route must be an absolute URL with a host, such as
/// `https://myapp.mybluemix.net`.
///
/// # Example
///
/// ```rust
/// use bms_core::AppRoute;
///
/// let route = AppRoute::new("https://myapp.mybluemix.net").unwrap();
/// assert_eq!(route.scheme(), "https");
/// assert_eq!(route.host_name(), Some("myapp.mybluemix.net"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppRoute(Url);

impl AppRoute {
    /// Creates a new validated app route.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAppRoute`] if the route is not an
    /// absolute URL with a host.
    pub fn new(route: impl Into<String>) -> Result<Self, ConfigError> {
        let route = route.into();
        let route = route.trim();

        let url = Url::parse(route).map_err(|_| ConfigError::InvalidAppRoute {
            route: route.to_string(),
        })?;

        if url.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::InvalidAppRoute {
                route: route.to_string(),
            });
        }

        Ok(Self(url))
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns the host name portion of the route.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the route as a parsed URL.
    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }
}

impl AsRef<str> for AppRoute {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AppRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Serialize for AppRoute {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for AppRoute {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated GUID of the backend application.
///
/// # Example
///
/// ```rust
/// use bms_core::AppGuid;
///
/// let guid = AppGuid::new("c2d5b4e0-1234-4c6b-9d0a-123456789abc").unwrap();
/// assert_eq!(guid.as_ref(), "c2d5b4e0-1234-4c6b-9d0a-123456789abc");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AppGuid(String);

impl AppGuid {
    /// Creates a new validated app GUID.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyAppGuid`] if the GUID is empty.
    pub fn new(guid: impl Into<String>) -> Result<Self, ConfigError> {
        let guid = guid.into();
        let guid = guid.trim();
        if guid.is_empty() {
            return Err(ConfigError::EmptyAppGuid);
        }
        Ok(Self(guid.to_string()))
    }
}

impl AsRef<str> for AppGuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for AppGuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AppGuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_route_accepts_absolute_urls() {
        let route = AppRoute::new("https://myapp.mybluemix.net").unwrap();
        assert_eq!(route.scheme(), "https");
        assert_eq!(route.host_name(), Some("myapp.mybluemix.net"));

        // With port and path
        let route = AppRoute::new("http://localhost:3000/api").unwrap();
        assert_eq!(route.scheme(), "http");
        assert_eq!(route.host_name(), Some("localhost"));
        assert_eq!(route.as_url().path(), "/api");

        // Surrounding whitespace is trimmed
        let route = AppRoute::new("  https://myapp.mybluemix.net  ").unwrap();
        assert_eq!(route.host_name(), Some("myapp.mybluemix.net"));
    }

    #[test]
    fn test_app_route_rejects_invalid() {
        // No scheme
        assert!(AppRoute::new("myapp.mybluemix.net").is_err());

        // Empty host
        assert!(AppRoute::new("https://").is_err());

        // No host at all
        assert!(AppRoute::new("mailto:someone@example.com").is_err());

        // Empty
        assert!(matches!(
            AppRoute::new(""),
            Err(ConfigError::InvalidAppRoute { .. })
        ));
    }

    #[test]
    fn test_app_guid_rejects_empty_string() {
        assert!(matches!(AppGuid::new(""), Err(ConfigError::EmptyAppGuid)));
        assert!(matches!(AppGuid::new("   "), Err(ConfigError::EmptyAppGuid)));
    }

    #[test]
    fn test_app_route_serializes_to_string() {
        let route = AppRoute::new("https://myapp.mybluemix.net").unwrap();
        let json = serde_json::to_string(&route).unwrap();
        assert_eq!(json, r#""https://myapp.mybluemix.net/""#);
    }

    #[test]
    fn test_app_route_deserialization_validates() {
        let route: AppRoute = serde_json::from_str(r#""https://a.example.com""#).unwrap();
        assert_eq!(route.host_name(), Some("a.example.com"));

        let result: Result<AppRoute, _> = serde_json::from_str(r#""not a url""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_app_guid_deserialization_validates() {
        let guid: AppGuid = serde_json::from_str(r#""abc-123""#).unwrap();
        assert_eq!(guid.as_ref(), "abc-123");

        let result: Result<AppGuid, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());
    }
}
