//! # BMS Core
//!
//! The core network layer shared by Bluemix Mobile Services client SDKs.
//! It builds and sends HTTP requests to a Bluemix backend and lets an
//! authorization service decorate them.
//!
//! ## Overview
//!
//! This crate provides:
//! - Instance-based configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for the backend route and application GUID
//! - Query parameter merging and request body encoding
//! - Async requests with redirect control, timeouts and round-trip timing
//! - Completion-closure requests that can be cancelled via [`RequestTask`]
//! - A pluggable [`AuthorizationManager`] and a bearer token implementation
//!
//! ## Quick Start
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
//! ```
//!
//! ## Making Requests
//!
//! ```rust,ignore
//! use bms_core::{ClientConfig, HttpMethod, HttpRequest};
//! use serde_json::json;
//!
//! let config = ClientConfig::builder().build()?;
//!
//! let mut request = HttpRequest::builder(&config, HttpMethod::Post, "https://myapp.mybluemix.net/items")
//!     .allow_redirects(false)
//!     .build()?;
//! request.set_body_json(&json!({"name": "widget"}))?;
//!
//! let response = request.send().await?;
//! if response.is_successful() {
//!     println!("{:?}", response.body_text);
//! }
//! ```
//!
//! ## Completion Closures
//!
//! ```rust,ignore
//! let mut task = request.send_with_completion(|result| match result {
//!     Ok(response) => println!("status {}", response.status_code),
//!     Err(err) if err.is_cancelled() => println!("cancelled"),
//!     Err(err) => println!("failed: {err}"),
//! });
//!
//! // Later, if the result is no longer needed:
//! task.cancel();
//! ```
//!
//! ## Authorization
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bms_core::auth::TokenAuthorizationManager;
//!
//! config.register_authorization_manager(Arc::new(TokenAuthorizationManager::new(source)));
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: Newtypes and builders validate on construction
//! - **Thread-safe**: All public types are `Send + Sync`
//! - **Async-first**: Designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;

// Re-export public types at crate root for convenience
pub use auth::{
    AuthorizationError, AuthorizationManager, DefaultAuthorizationManager, PersistencePolicy,
    TokenAuthorizationManager, TokenSource,
};
pub use config::{
    AppGuid, AppRoute, BluemixRegion, ClientConfig, ClientConfigBuilder, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::ConfigError;

// Re-export HTTP types
pub use clients::{
    BodyEncodingError, DataType, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, InvalidHttpRequestError, RequestBody, RequestTask, TransportError,
    UrlConstructionError,
};
