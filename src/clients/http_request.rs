//! HTTP request types for the BMS Core SDK.
//!
//! This module provides the [`HttpRequest`] type, its builder, and the send
//! operation that performs the network exchange.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Url;
use serde::Serialize;

use crate::auth::{AuthorizationManager, AUTHORIZATION_HEADER};
use crate::clients::errors::{
    BodyEncodingError, HttpError, InvalidHttpRequestError, TransportError,
};
use crate::clients::http_response::HttpResponse;
use crate::clients::request_body::RequestBody;
use crate::clients::url_builder::{append_query_parameters, try_append_query_parameters};
use crate::config::ClientConfig;

/// Name of the header set by the body setters.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// HTTP methods supported by the SDK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
    /// HTTP TRACE method.
    Trace,
    /// HTTP HEAD method.
    Head,
    /// HTTP OPTIONS method.
    Options,
    /// HTTP CONNECT method.
    Connect,
    /// HTTP PATCH method.
    Patch,
}

impl HttpMethod {
    /// Returns the method token as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Trace => "TRACE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Patch => "PATCH",
        }
    }

    /// Returns every supported method.
    #[must_use]
    pub const fn all() -> [Self; 9] {
        [
            Self::Get,
            Self::Post,
            Self::Put,
            Self::Delete,
            Self::Trace,
            Self::Head,
            Self::Options,
            Self::Connect,
            Self::Patch,
        ]
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = InvalidHttpRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidHttpRequestError::InvalidMethod {
                method: s.to_string(),
            })
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Trace => Self::TRACE,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Options => Self::OPTIONS,
            HttpMethod::Connect => Self::CONNECT,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

/// An HTTP request to be sent to the backend.
///
/// The URL, method and query parameters are fixed when the request is
/// built. Headers, body and timeout can be changed until the request is
/// sent. A request is meant to be sent once.
///
/// # Example
///
/// ```rust,ignore
/// use bms_core::ClientConfig;
/// use bms_core::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let config = ClientConfig::builder().build()?;
///
/// let mut request = HttpRequest::builder(&config, HttpMethod::Post, "https://example.com/items")
///     .query_param("verbose", "true")
///     .build()?;
/// request.set_body_json(&json!({"name": "widget"}))?;
///
/// let response = request.send().await?;
/// println!("{}: {:?}", response.status_code, response.body_text);
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    resource_url: Url,
    method: HttpMethod,
    timeout: Duration,
    headers: HashMap<String, String>,
    query_parameters: Option<HashMap<String, String>>,
    request_body: Option<Vec<u8>>,
    allow_redirects: bool,
    tries: u32,
    authorization_manager: Arc<dyn AuthorizationManager>,
    start_time: Option<Instant>,
}

impl HttpRequest {
    /// Creates a new builder using `config` for the default timeout and
    /// authorization manager.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bms_core::ClientConfig;
    /// use bms_core::clients::{HttpMethod, HttpRequest};
    ///
    /// let config = ClientConfig::builder().build().unwrap();
    /// let request = HttpRequest::builder(&config, HttpMethod::Get, "https://example.com/items")
    ///     .query_param("page", "2")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(request.resource_url().as_str(), "https://example.com/items?page=2");
    /// ```
    #[must_use]
    pub fn builder(
        config: &ClientConfig,
        method: HttpMethod,
        url: impl Into<String>,
    ) -> HttpRequestBuilder {
        HttpRequestBuilder::new(config, method, url)
    }

    /// Returns the URL the request is sent to, query parameters included.
    #[must_use]
    pub const fn resource_url(&self) -> &Url {
        &self.resource_url
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Changes the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError::InvalidTimeout`] if `timeout` is zero.
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<(), InvalidHttpRequestError> {
        if timeout.is_zero() {
            return Err(InvalidHttpRequestError::InvalidTimeout);
        }
        self.timeout = timeout;
        Ok(())
    }

    /// Returns all request headers.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Sets a header, replacing any existing header with the same
    /// case-insensitive name.
    ///
    /// Intended for [`AuthorizationManager`] implementations. Names and
    /// values are validated when the request is sent.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        replace_header(&mut self.headers, name.into(), value.into());
    }

    /// Returns the query parameters that were merged into the URL.
    #[must_use]
    pub const fn query_parameters(&self) -> Option<&HashMap<String, String>> {
        self.query_parameters.as_ref()
    }

    /// Returns the encoded request body, if one has been set.
    #[must_use]
    pub fn request_body(&self) -> Option<&[u8]> {
        self.request_body.as_deref()
    }

    /// Returns whether 3xx responses are followed.
    #[must_use]
    pub const fn allow_redirects(&self) -> bool {
        self.allow_redirects
    }

    /// Changes whether 3xx responses are followed.
    pub fn set_allow_redirects(&mut self, allow_redirects: bool) {
        self.allow_redirects = allow_redirects;
    }

    /// Returns how many times the request may be sent when the server
    /// demands (re)authorization.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Sets the request body.
    ///
    /// The body's default `Content-Type` is applied only if the request has
    /// no `Content-Type` header yet. On error the request is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BodyEncodingError`] if the body cannot be encoded.
    pub fn set_body(&mut self, body: RequestBody) -> Result<(), BodyEncodingError> {
        let content_type = body.default_content_type();
        let bytes = body.encode()?;

        self.request_body = Some(bytes);
        if let Some(content_type) = content_type {
            if self.header(CONTENT_TYPE_HEADER).is_none() {
                self.headers
                    .insert(CONTENT_TYPE_HEADER.to_string(), content_type.to_string());
            }
        }
        Ok(())
    }

    /// Sets the body to `value` serialized as JSON.
    ///
    /// Sets `Content-Type: application/json` if no `Content-Type` is present.
    ///
    /// # Errors
    ///
    /// Returns [`BodyEncodingError::Json`] if `value` has no JSON
    /// representation. The request is left unchanged.
    pub fn set_body_json<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<(), BodyEncodingError> {
        self.set_body(RequestBody::json(value)?)
    }

    /// Sets the body to `text` encoded as UTF-8.
    ///
    /// Sets `Content-Type: text/plain` if no `Content-Type` is present.
    ///
    /// # Errors
    ///
    /// Returns [`BodyEncodingError`] if the text cannot be encoded.
    pub fn set_body_text(&mut self, text: impl Into<String>) -> Result<(), BodyEncodingError> {
        self.set_body(RequestBody::Text(text.into()))
    }

    /// Sets the body to `bytes` verbatim. Headers are not touched.
    pub fn set_body_bytes(&mut self, bytes: impl Into<Vec<u8>>) {
        self.request_body = Some(bytes.into());
    }

    /// Sends the request and waits for the response.
    ///
    /// Before sending, the authorization manager may add its cached header.
    /// When the manager reports that a response requires authorization and
    /// [`tries`](Self::tries) allows another attempt, a fresh header is
    /// obtained and the request is sent again. Failing to obtain a header
    /// does not fail the send; the last response is returned.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidRequest`] if a header cannot be sent, or
    /// [`HttpError::Transport`] if the exchange fails (DNS, connection,
    /// TLS, timeout).
    pub async fn send(&mut self) -> Result<HttpResponse, HttpError> {
        let manager = Arc::clone(&self.authorization_manager);
        manager.add_cached_authorization_header(self);

        let client = self.build_client()?;

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let response = self.dispatch(&client).await?;

            if tries >= self.tries || !manager.is_authorization_required_for_response(&response)
            {
                return Ok(response);
            }

            match manager.obtain_authorization_header().await {
                Ok(Some(header)) => self.set_header(AUTHORIZATION_HEADER, header),
                Ok(None) => return Ok(response),
                Err(err) => {
                    tracing::warn!(
                        "Could not obtain authorization for {} {}: {}",
                        self.method,
                        self.resource_url,
                        err
                    );
                    return Ok(response);
                }
            }
        }
    }

    /// Sends the request in the background and passes the outcome to
    /// `completion`.
    ///
    /// `completion` runs exactly once, on a Tokio worker, whether the
    /// request succeeds, fails, or is cancelled through the returned
    /// [`RequestTask`]. Dropping the task does not cancel the request.
    ///
    /// When called outside a Tokio runtime, `completion` runs immediately
    /// with [`TransportError::NoRuntime`].
    pub fn send_with_completion<F>(self, completion: F) -> RequestTask
    where
        F: FnOnce(Result<HttpResponse, HttpError>) + Send + 'static,
    {
        RequestTask::spawn(self, completion)
    }

    fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        let redirect = if self.allow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.timeout)
            .redirect(redirect)
            .build()
            .map_err(TransportError::Client)
    }

    fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, InvalidHttpRequestError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let invalid = || InvalidHttpRequestError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    /// Performs one exchange and records its round-trip time.
    async fn dispatch(&mut self, client: &reqwest::Client) -> Result<HttpResponse, HttpError> {
        let headers = Self::header_map(&self.headers)?;
        let mut req_builder = client
            .request(self.method.into(), self.resource_url.clone())
            .headers(headers);
        if let Some(body) = &self.request_body {
            req_builder = req_builder.body(body.clone());
        }

        self.start_time = Some(Instant::now());
        let result = Self::exchange(req_builder).await;
        let round_trip_time = self
            .start_time
            .take()
            .map_or(Duration::ZERO, |start_time| start_time.elapsed());

        let response = result?.with_round_trip_time(round_trip_time);
        tracing::debug!(
            "{} {} completed with status {} in {:?}",
            self.method,
            self.resource_url,
            response.status_code,
            round_trip_time
        );
        Ok(response)
    }

    async fn exchange(req_builder: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
        let res = req_builder.send().await?;

        let status_code = res.status().as_u16();
        let headers = HttpResponse::parse_response_headers(res.headers());
        let url = res.url().clone();
        let body = res.bytes().await?.to_vec();

        Ok(HttpResponse::new(status_code, headers, body).with_url(url))
    }
}

/// Builder for constructing [`HttpRequest`] instances.
///
/// Provides a fluent API for building requests with optional parameters.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: HttpMethod,
    url: String,
    timeout: Duration,
    headers: HashMap<String, String>,
    query: Option<HashMap<String, String>>,
    allow_redirects: bool,
    tries: u32,
    strict_urls: bool,
    authorization_manager: Arc<dyn AuthorizationManager>,
}

impl HttpRequestBuilder {
    /// Creates a new builder with defaults taken from `config`.
    fn new(config: &ClientConfig, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            timeout: config.default_request_timeout(),
            headers: HashMap::new(),
            query: None,
            allow_redirects: true,
            tries: 1,
            strict_urls: false,
            authorization_manager: config.authorization_manager(),
        }
    }

    /// Overrides the config's default timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds all headers in `headers`, replacing earlier headers with the
    /// same case-insensitive name.
    #[must_use]
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        for (key, value) in headers {
            replace_header(&mut self.headers, key, value);
        }
        self
    }

    /// Adds a single header, replacing an earlier header with the same
    /// case-insensitive name.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        replace_header(&mut self.headers, key.into(), value.into());
        self
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn query(mut self, query: HashMap<String, String>) -> Self {
        self.query = Some(query);
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets whether 3xx responses are followed (default: `true`).
    #[must_use]
    pub const fn allow_redirects(mut self, allow_redirects: bool) -> Self {
        self.allow_redirects = allow_redirects;
        self
    }

    /// Sets how many times the request may be sent when the server demands
    /// (re)authorization.
    ///
    /// Default is 1 (no re-authorization). Values below 1 are treated as 1.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Fails the build when query parameters cannot be merged into the URL,
    /// instead of falling back to the unmodified URL (default: `false`).
    #[must_use]
    pub const fn strict_urls(mut self, strict_urls: bool) -> Self {
        self.strict_urls = strict_urls;
        self
    }

    /// Uses `manager` instead of the config's authorization manager.
    #[must_use]
    pub fn authorization_manager(mut self, manager: Arc<dyn AuthorizationManager>) -> Self {
        self.authorization_manager = manager;
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - the URL is not an absolute URL (`InvalidUrl`)
    /// - the timeout is zero (`InvalidTimeout`)
    /// - a header name or value is invalid (`InvalidHeader`)
    /// - strict mode is on and the query cannot be merged (`UrlConstruction`)
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let url = Url::parse(self.url.trim()).map_err(|err| InvalidHttpRequestError::InvalidUrl {
            url: self.url.clone(),
            reason: err.to_string(),
        })?;

        if self.timeout.is_zero() {
            return Err(InvalidHttpRequestError::InvalidTimeout);
        }

        HttpRequest::header_map(&self.headers)?;

        let resource_url = match &self.query {
            Some(query) if self.strict_urls => try_append_query_parameters(query, &url)?,
            Some(query) => append_query_parameters(query, &url),
            None => url,
        };

        Ok(HttpRequest {
            resource_url,
            method: self.method,
            timeout: self.timeout,
            headers: self.headers,
            query_parameters: self.query,
            request_body: None,
            allow_redirects: self.allow_redirects,
            tries: self.tries.max(1),
            authorization_manager: self.authorization_manager,
            start_time: None,
        })
    }
}

fn replace_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

// Verify HttpRequest is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpRequest>();
};

/// Handle to a request started with [`HttpRequest::send_with_completion`].
#[derive(Debug)]
pub struct RequestTask {
    cancel: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl RequestTask {
    fn spawn<F>(mut request: HttpRequest, completion: F) -> Self
    where
        F: FnOnce(Result<HttpResponse, HttpError>) + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            completion(Err(TransportError::NoRuntime.into()));
            return Self {
                cancel: None,
                handle: None,
            };
        };

        let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = runtime.spawn(async move {
            let result = tokio::select! {
                result = request.send() => result,
                Ok(()) = cancel_rx => Err(TransportError::Cancelled.into()),
            };
            completion(result);
        });

        Self {
            cancel: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    /// Cancels the request if it is still in flight.
    ///
    /// The completion then receives [`TransportError::Cancelled`]. Has no
    /// effect once the completion has run.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    /// Returns `true` once the completion has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, tokio::task::JoinHandle::is_finished)
    }

    /// Waits until the completion has run.
    pub async fn wait(self) {
        if let Some(handle) = self.handle {
            if let Err(err) = handle.await {
                tracing::warn!("Request task ended abnormally: {err}");
            }
        }
    }
}
