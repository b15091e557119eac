//! Authorization types for the BMS Core SDK.
//!
//! This module provides the pluggable authorization hook consulted by every
//! [`HttpRequest`](crate::clients::HttpRequest).
//!
//! # Overview
//!
//! - [`AuthorizationManager`]: The capability trait requests consult
//! - [`DefaultAuthorizationManager`]: The no-op manager used when none is registered
//! - [`TokenAuthorizationManager`]: A bearer token manager backed by a [`TokenSource`]
//! - [`PersistencePolicy`]: Whether obtained headers survive restarts
//! - [`AuthorizationError`]: Failures while obtaining a header
//!
//! # Registering a Manager
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bms_core::ClientConfig;
//! use bms_core::auth::TokenAuthorizationManager;
//!
//! let config = ClientConfig::builder().build()?;
//! config.register_authorization_manager(Arc::new(TokenAuthorizationManager::new(source)));
//!
//! // Every request built from `config` now carries the cached bearer token.
//! ```

mod error;
mod manager;
mod token;

pub use error::AuthorizationError;
pub use manager::{
    AuthorizationFuture, AuthorizationManager, DefaultAuthorizationManager, Identity,
    PersistencePolicy, AUTHORIZATION_HEADER,
};
pub use token::{AuthorizationState, TokenAuthorizationManager, TokenSource};
