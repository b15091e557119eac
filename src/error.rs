//! Error types for the BMS Core SDK.
//!
//! This module contains error types used throughout the SDK for configuration
//! and validation errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use bms_core::{AppGuid, ConfigError};
//!
//! let result = AppGuid::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyAppGuid)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// App route is not a valid absolute URL.
    #[error("Invalid app route '{route}'. Please provide a valid URL with scheme (e.g., 'https://myapp.mybluemix.net').")]
    InvalidAppRoute {
        /// The invalid route that was provided.
        route: String,
    },

    /// App GUID cannot be empty.
    #[error("App GUID cannot be empty. Please provide the GUID of the Bluemix application.")]
    EmptyAppGuid,

    /// Region is not one of the known regions.
    #[error("Invalid region '{region}'. Expected one of: US_SOUTH, UK, SYDNEY.")]
    InvalidRegion {
        /// The invalid region that was provided.
        region: String,
    },

    /// Request timeout must be positive.
    #[error("Invalid default request timeout. The timeout must be greater than zero.")]
    InvalidTimeout,
}
