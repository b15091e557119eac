//! HTTP response types for the BMS Core SDK.
//!
//! This module provides the [`HttpResponse`] type, an immutable snapshot of
//! one completed exchange.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

/// An HTTP response received for an [`HttpRequest`](crate::clients::HttpRequest).
///
/// Header names are stored lowercased. Repeated headers are joined with
/// `", "`.
///
/// # Example
///
/// ```rust
/// use bms_core::clients::HttpResponse;
/// use std::collections::HashMap;
///
/// let mut headers = HashMap::new();
/// headers.insert("content-type".to_string(), "text/plain".to_string());
///
/// let response = HttpResponse::new(200, headers, b"hello".to_vec());
/// assert!(response.is_successful());
/// assert_eq!(response.body_text.as_deref(), Some("hello"));
/// assert_eq!(response.header("Content-Type"), Some("text/plain"));
/// ```
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status_code: u16,
    /// Response headers keyed by lowercased name.
    pub headers: HashMap<String, String>,
    /// The raw response body.
    pub body: Vec<u8>,
    /// The body decoded as UTF-8, if it is valid UTF-8.
    pub body_text: Option<String>,
    /// The URL that produced this response, after any followed redirects.
    pub url: Option<Url>,
    /// Time between dispatching the request and receiving the full body.
    pub round_trip_time: Duration,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, decoding the body text when possible.
    #[must_use]
    pub fn new(status_code: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();
        let body_text = String::from_utf8(body.clone()).ok();

        Self {
            status_code,
            headers,
            body,
            body_text,
            url: None,
            round_trip_time: Duration::ZERO,
        }
    }

    pub(crate) fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub(crate) const fn with_round_trip_time(mut self, round_trip_time: Duration) -> Self {
        self.round_trip_time = round_trip_time;
        self
    }

    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.status_code >= 200 && self.status_code <= 299
    }

    /// Returns `true` if the status code is in the 3xx range.
    ///
    /// Only observed when the request disallowed redirects, or when the
    /// server sent a 3xx without a usable `Location`.
    #[must_use]
    pub const fn is_redirect(&self) -> bool {
        self.status_code >= 300 && self.status_code <= 399
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Collects reqwest's header map into a lowercased `HashMap`.
    pub(crate) fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, String> {
        let mut result: HashMap<String, String> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            result
                .entry(key)
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        result
    }
}
