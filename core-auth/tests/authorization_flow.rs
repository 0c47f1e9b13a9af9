//! End-to-end authorization flow tests against stub bridges.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::player::TokenSupplier;
use bridge_traits::storage::KeyValueStore;
use bridge_traits::time::Clock;
use core_auth::store::{
    KEY_ACCESS_TOKEN, KEY_CODE_VERIFIER, KEY_EXPIRES_AT, KEY_REFRESH_TOKEN, KEY_TOKEN_TYPE,
};
use core_auth::{AuthError, AuthManager, CallbackParams};
use core_runtime::config::StreamingConfig;
use core_runtime::events::EventBus;

#[derive(Default)]
struct MapStore {
    map: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MapStore {
    async fn get(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }
    async fn set(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
    async fn remove(&self, key: &str) -> BridgeResult<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
    async fn clear_all(&self) -> BridgeResult<()> {
        self.map.lock().unwrap().clear();
        Ok(())
    }
}

struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Replays queued responses and records every request it sees.
#[derive(Default)]
struct ScriptedHttpClient {
    responses: Mutex<Vec<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn push_json(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        });
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        assert!(!responses.is_empty(), "unexpected HTTP request");
        Ok(responses.remove(0))
    }
}

fn start_instant() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

struct Fixture {
    manager: AuthManager,
    storage: Arc<MapStore>,
    http: Arc<ScriptedHttpClient>,
    clock: Arc<ManualClock>,
}

fn fixture() -> Fixture {
    let storage = Arc::new(MapStore::default());
    let http = Arc::new(ScriptedHttpClient::default());
    let clock = Arc::new(ManualClock::at(start_instant()));
    let manager = AuthManager::new(
        StreamingConfig::new("client-123", "https://app.example/callback"),
        http.clone(),
        storage.clone(),
        clock.clone(),
        EventBus::new(16),
    );
    Fixture {
        manager,
        storage,
        http,
        clock,
    }
}

#[tokio::test]
async fn happy_path_stores_credential_and_consumes_verifier() {
    let fx = fixture();

    let url = fx.manager.begin_authorization().await.unwrap();
    assert!(url.as_str().starts_with("https://accounts.spotify.com/authorize"));
    assert!(fx.storage.contains(KEY_CODE_VERIFIER).await.unwrap());

    fx.http.push_json(
        200,
        r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#,
    );
    let credential = fx
        .manager
        .complete_authorization(&CallbackParams::from_query("code=abc123"))
        .await
        .unwrap();

    assert_eq!(credential.access_token, "tok");
    assert_eq!(
        credential.expires_at,
        start_instant() + Duration::seconds(3600)
    );
    // Verifier key is gone after the exchange
    assert!(!fx.storage.contains(KEY_CODE_VERIFIER).await.unwrap());
    // Credential fields persisted under the well-known keys
    assert_eq!(
        fx.storage.get(KEY_ACCESS_TOKEN).await.unwrap().as_deref(),
        Some("tok")
    );
    assert_eq!(
        fx.storage.get(KEY_TOKEN_TYPE).await.unwrap().as_deref(),
        Some("Bearer")
    );
    assert_eq!(
        fx.storage.get(KEY_EXPIRES_AT).await.unwrap().as_deref(),
        Some(credential.expires_at.timestamp().to_string().as_str())
    );
}

#[tokio::test]
async fn error_param_takes_precedence_over_code() {
    let fx = fixture();
    fx.manager.begin_authorization().await.unwrap();

    let err = fx
        .manager
        .complete_authorization(&CallbackParams::from_query(
            "error=access_denied&code=abc123",
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthError::AuthorizationDenied { ref reason } if reason == "access_denied"
    ));
    // No token-endpoint call was made
    assert_eq!(fx.http.request_count(), 0);
    // The failed attempt's verifier is not left behind
    assert!(!fx.storage.contains(KEY_CODE_VERIFIER).await.unwrap());
}

#[tokio::test]
async fn missing_code_fails_without_network() {
    let fx = fixture();
    fx.manager.begin_authorization().await.unwrap();

    let err = fx
        .manager
        .complete_authorization(&CallbackParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MissingCode));
    assert_eq!(fx.http.request_count(), 0);
}

#[tokio::test]
async fn missing_verifier_fails_without_network() {
    let fx = fixture();
    // No begin_authorization: simulates a flow started in another session.

    let err = fx
        .manager
        .complete_authorization(&CallbackParams::from_query("code=abc123"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MissingVerifier));
    assert_eq!(fx.http.request_count(), 0);
}

#[tokio::test]
async fn second_attempt_overwrites_first_verifier() {
    let fx = fixture();

    fx.manager.begin_authorization().await.unwrap();
    let first = fx.storage.get(KEY_CODE_VERIFIER).await.unwrap().unwrap();

    fx.manager.begin_authorization().await.unwrap();
    let second = fx.storage.get(KEY_CODE_VERIFIER).await.unwrap().unwrap();
    assert_ne!(first, second);

    // The exchange uses whatever verifier is currently stored.
    fx.http.push_json(
        200,
        r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#,
    );
    fx.manager
        .complete_authorization(&CallbackParams::from_query("code=abc123"))
        .await
        .unwrap();

    let request = &fx.http.requests.lock().unwrap()[0];
    let body = String::from_utf8(request.body.as_ref().unwrap().to_vec()).unwrap();
    assert!(body.contains(&format!("code_verifier={}", second)));
    assert!(!body.contains(&format!("code_verifier={}", first)));
}

#[tokio::test]
async fn token_endpoint_rejection_clears_verifier() {
    let fx = fixture();
    fx.manager.begin_authorization().await.unwrap();

    fx.http.push_json(
        400,
        r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#,
    );
    let err = fx
        .manager
        .complete_authorization(&CallbackParams::from_query("code=stale"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::TokenEndpoint { status: 400, .. }));
    assert!(!fx.storage.contains(KEY_CODE_VERIFIER).await.unwrap());
    // Nothing was persisted for the failed attempt
    assert!(!fx.storage.contains(KEY_ACCESS_TOKEN).await.unwrap());
}

#[tokio::test]
async fn valid_credential_absent_at_and_after_expiry() {
    let fx = fixture();
    fx.manager.begin_authorization().await.unwrap();
    fx.http.push_json(
        200,
        r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#,
    );
    fx.manager
        .complete_authorization(&CallbackParams::from_query("code=abc123"))
        .await
        .unwrap();

    assert!(fx.manager.valid_credential().await.unwrap().is_some());

    // Exactly at expiry the credential is unusable and gets cleared.
    fx.clock.advance(Duration::seconds(3600));
    assert!(fx.manager.valid_credential().await.unwrap().is_none());
    assert!(!fx.storage.contains(KEY_ACCESS_TOKEN).await.unwrap());

    // And it stays absent afterwards.
    fx.clock.advance(Duration::seconds(60));
    assert!(fx.manager.valid_credential().await.unwrap().is_none());
}

#[tokio::test]
async fn revoke_clears_every_persisted_key() {
    let fx = fixture();
    fx.manager.begin_authorization().await.unwrap();
    fx.http.push_json(
        200,
        r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600,"refresh_token":"ref"}"#,
    );
    fx.manager
        .complete_authorization(&CallbackParams::from_query("code=abc123"))
        .await
        .unwrap();
    // A fresh verifier from a new attempt must also be swept.
    fx.manager.begin_authorization().await.unwrap();

    fx.manager.revoke().await.unwrap();

    for key in [
        KEY_ACCESS_TOKEN,
        KEY_TOKEN_TYPE,
        KEY_EXPIRES_AT,
        KEY_REFRESH_TOKEN,
        KEY_CODE_VERIFIER,
    ] {
        assert!(!fx.storage.contains(key).await.unwrap(), "{key} not cleared");
    }
}

#[tokio::test]
async fn token_supplier_reflects_credential_validity() {
    let fx = fixture();

    // Unauthenticated: the supplier reports no token.
    assert!(fx.manager.access_token().await.is_err());

    fx.manager.begin_authorization().await.unwrap();
    fx.http.push_json(
        200,
        r#"{"access_token":"tok","token_type":"Bearer","expires_in":3600}"#,
    );
    fx.manager
        .complete_authorization(&CallbackParams::from_query("code=abc123"))
        .await
        .unwrap();

    assert_eq!(fx.manager.access_token().await.unwrap(), "tok");

    fx.clock.advance(Duration::seconds(7200));
    assert!(fx.manager.access_token().await.is_err());
}
