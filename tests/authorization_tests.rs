//! Integration tests for request authorization.
//!
//! These tests verify that registered authorization managers decorate
//! outgoing requests and that bearer challenges trigger re-authorization.

use bms_core::auth::{
    AuthorizationError, AuthorizationFuture, AuthorizationState, PersistencePolicy,
    TokenAuthorizationManager, TokenSource,
};
use bms_core::clients::{HttpMethod, HttpRequest};
use bms_core::{AuthorizationManager, ClientConfig};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHALLENGE: &str = r#"Bearer realm="imfAuthentication", scope="RegisteredClient""#;

/// Returns the current Unix timestamp
fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Creates a signed test token for `user`
fn create_test_jwt(user: &str) -> String {
    let claims = json!({
        "exp": current_timestamp() + 300,
        "imf.user": {"id": user},
        "imf.device": {"id": "device-1"},
        "imf.application": {"id": "com.example.app"}
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

#[derive(Debug)]
struct CountingSource {
    token: Option<String>,
    fetches: AtomicUsize,
}

impl CountingSource {
    fn issuing(token: &str) -> Arc<Self> {
        Arc::new(Self {
            token: Some(token.to_string()),
            fetches: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            token: None,
            fetches: AtomicUsize::new(0),
        })
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl TokenSource for CountingSource {
    fn fetch_token(&self) -> AuthorizationFuture<'_, String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = self
            .token
            .clone()
            .ok_or_else(|| AuthorizationError::ObtainFailed {
                reason: "authorization server unreachable".to_string(),
            });
        Box::pin(async move { result })
    }
}

/// Mounts a resource that answers 200 for `token` and a bearer challenge otherwise.
async fn mount_protected(server: &MockServer, token: &str, expected_successes: u64) {
    Mock::given(method("GET"))
        .and(path("/protected"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(expected_successes)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/protected"))
        .respond_with(ResponseTemplate::new(401).insert_header("WWW-Authenticate", CHALLENGE))
        .mount(server)
        .await;
}

fn config_with(source: Arc<CountingSource>) -> (ClientConfig, Arc<TokenAuthorizationManager>) {
    let manager = Arc::new(TokenAuthorizationManager::from_shared(source));
    manager.set_authorization_persistence_policy(PersistencePolicy::Always);
    let config = ClientConfig::builder()
        .authorization_manager(manager.clone())
        .build()
        .unwrap();
    (config, manager)
}

#[tokio::test]
async fn test_challenge_triggers_reauthorization_within_tries() {
    let server = MockServer::start().await;
    let token = create_test_jwt("user-1");
    mount_protected(&server, &token, 1).await;

    let source = CountingSource::issuing(&token);
    let (config, manager) = config_with(source.clone());

    let mut request = HttpRequest::builder(
        &config,
        HttpMethod::Get,
        format!("{}/protected", server.uri()),
    )
    .tries(2)
    .build()
    .unwrap();

    let response = request.send().await.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body_text.as_deref(), Some("secret"));
    assert_eq!(source.fetches(), 1);
    assert_eq!(manager.state(), AuthorizationState::Cached);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_cached_header_is_attached_before_first_attempt() {
    let server = MockServer::start().await;
    let token = create_test_jwt("user-1");
    mount_protected(&server, &token, 2).await;

    let source = CountingSource::issuing(&token);
    let (config, _manager) = config_with(source.clone());
    let url = format!("{}/protected", server.uri());

    let mut first = HttpRequest::builder(&config, HttpMethod::Get, url.as_str())
        .tries(2)
        .build()
        .unwrap();
    assert_eq!(first.send().await.unwrap().status_code, 200);

    let mut second = HttpRequest::builder(&config, HttpMethod::Get, url.as_str())
        .build()
        .unwrap();
    assert_eq!(second.send().await.unwrap().status_code, 200);

    assert_eq!(source.fetches(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_never_policy_reauthorizes_every_request() {
    let server = MockServer::start().await;
    let token = create_test_jwt("user-1");
    mount_protected(&server, &token, 2).await;

    let source = CountingSource::issuing(&token);
    let (config, manager) = config_with(source.clone());
    manager.set_authorization_persistence_policy(PersistencePolicy::Never);
    let url = format!("{}/protected", server.uri());

    for _ in 0..2 {
        let mut request = HttpRequest::builder(&config, HttpMethod::Get, url.as_str())
            .tries(2)
            .build()
            .unwrap();
        assert_eq!(request.send().await.unwrap().status_code, 200);
    }

    assert_eq!(source.fetches(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_single_try_returns_challenge_without_obtaining() {
    let server = MockServer::start().await;
    let token = create_test_jwt("user-1");
    mount_protected(&server, &token, 0).await;

    let source = CountingSource::issuing(&token);
    let (config, manager) = config_with(source.clone());

    let mut request = HttpRequest::builder(
        &config,
        HttpMethod::Get,
        format!("{}/protected", server.uri()),
    )
    .build()
    .unwrap();

    let response = request.send().await.unwrap();

    assert_eq!(response.status_code, 401);
    assert!(manager.is_authorization_required_for_response(&response));
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_obtain_failure_returns_last_response() {
    let server = MockServer::start().await;
    mount_protected(&server, "never-issued", 0).await;

    let source = CountingSource::failing();
    let (config, manager) = config_with(source.clone());

    let mut request = HttpRequest::builder(
        &config,
        HttpMethod::Get,
        format!("{}/protected", server.uri()),
    )
    .tries(3)
    .build()
    .unwrap();

    let response = request.send().await.unwrap();

    assert_eq!(response.status_code, 401);
    assert_eq!(source.fetches(), 1);
    assert_eq!(manager.state(), AuthorizationState::Unauthenticated);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_manager_registered_after_build_is_not_used() {
    let server = MockServer::start().await;
    let token = create_test_jwt("user-1");
    mount_protected(&server, &token, 0).await;

    let config = ClientConfig::builder().build().unwrap();
    let mut request = HttpRequest::builder(
        &config,
        HttpMethod::Get,
        format!("{}/protected", server.uri()),
    )
    .tries(2)
    .build()
    .unwrap();

    let source = CountingSource::issuing(&token);
    config.register_authorization_manager(Arc::new(TokenAuthorizationManager::from_shared(
        source.clone(),
    )));

    let response = request.send().await.unwrap();

    assert_eq!(response.status_code, 401);
    assert_eq!(source.fetches(), 0);
}

#[tokio::test]
async fn test_identities_available_after_authorization() {
    let server = MockServer::start().await;
    let token = create_test_jwt("user-42");
    mount_protected(&server, &token, 1).await;

    let (config, manager) = config_with(CountingSource::issuing(&token));
    assert!(manager.user_identity().is_none());

    let mut request = HttpRequest::builder(
        &config,
        HttpMethod::Get,
        format!("{}/protected", server.uri()),
    )
    .tries(2)
    .build()
    .unwrap();
    request.send().await.unwrap();

    assert_eq!(manager.user_identity().unwrap()["id"], "user-42");
    assert_eq!(manager.device_identity().unwrap()["id"], "device-1");
    assert_eq!(manager.app_identity().unwrap()["id"], "com.example.app");

    manager.clear_authorization_data();
    assert!(manager.user_identity().is_none());
    assert!(manager.cached_authorization_header().is_none());
}
