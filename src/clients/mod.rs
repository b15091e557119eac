//! HTTP request types for Bluemix Mobile Services communication.
//!
//! This module provides the request layer every BMS client service builds
//! on. It handles URL construction, body encoding, authorization hooks and
//! the network exchange itself.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpRequest`]: A request to be sent to the backend
//! - [`HttpRequestBuilder`]: A builder for constructing [`HttpRequest`] instances
//! - [`HttpResponse`]: The response to a sent request
//! - [`HttpMethod`]: Supported HTTP methods
//! - [`RequestBody`]: A request body as bytes, text or JSON
//! - [`RequestTask`]: Handle to a request sent with a completion closure
//! - [`append_query_parameters`]: Merges query parameters into a URL
//!
//! # Example
//!
//! ```rust,ignore
//! use bms_core::ClientConfig;
//! use bms_core::clients::{HttpMethod, HttpRequest};
//!
//! let config = ClientConfig::builder().build()?;
//!
//! let mut request = HttpRequest::builder(&config, HttpMethod::Get, "https://myapp.mybluemix.net/items")
//!     .query_param("page", "1")
//!     .build()?;
//!
//! let response = request.send().await?;
//! println!("{} after {:?}", response.status_code, response.round_trip_time);
//! ```
//!
//! # Authorization
//!
//! Each request consults the [`AuthorizationManager`](crate::auth::AuthorizationManager)
//! registered on its config when it is built. A cached header is attached
//! before the first attempt. With `.tries(n)` on the builder, a response the
//! manager classifies as an authorization challenge triggers a fresh header
//! and another attempt, up to `n` attempts in total.
//!
//! The default `tries` is 1, meaning no re-authorization.

mod errors;
mod http_request;
mod http_response;
mod request_body;
mod url_builder;

pub use errors::{
    BodyEncodingError, HttpError, InvalidHttpRequestError, TransportError, UrlConstructionError,
};
pub use http_request::{
    HttpMethod, HttpRequest, HttpRequestBuilder, RequestTask, CONTENT_TYPE_HEADER,
};
pub use http_response::HttpResponse;
pub use request_body::{DataType, RequestBody};
pub use url_builder::{append_query_parameters, try_append_query_parameters};
