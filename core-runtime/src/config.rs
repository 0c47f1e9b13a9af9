//! # Core Configuration Module
//!
//! Provides configuration management for the Lyrics Companion Core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all injected bridges and the streaming-vendor settings
//! the core needs. It enforces fail-fast validation so a missing bridge or a
//! malformed endpoint surfaces at startup, not at first use.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - token exchange, search and playback-control requests
//! - `KeyValueStore` - durable credential and verifier persistence
//! - `PlayerBridge` - the vendor playback SDK wrapper
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `Clock` - time source (defaults to [`SystemClock`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, StreamingConfig};
//!
//! let config = CoreConfig::builder()
//!     .streaming(StreamingConfig::new("client-id", "https://app.example/callback"))
//!     .http_client(http)
//!     .storage(store)
//!     .player(player)
//!     .build()?;
//! ```

use std::sync::Arc;

use bridge_traits::{http::HttpClient, player::PlayerBridge, storage::KeyValueStore};
use bridge_traits::time::{Clock, SystemClock};
use url::Url;

use crate::error::{CoreError, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Streaming vendor endpoints and client settings.
///
/// Defaults target the vendor's production endpoints; every field can be
/// overridden, which tests use to point the core at stub servers.
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// OAuth client identifier of this (public) application.
    pub client_id: String,
    /// Redirect target resolving to the application's callback route.
    pub redirect_uri: String,
    /// Vendor authorization endpoint.
    pub authorize_url: String,
    /// Vendor token endpoint.
    pub token_url: String,
    /// Base URL of the vendor web API.
    pub api_base_url: String,
    /// OAuth scopes requested during authorization.
    pub scopes: Vec<String>,
    /// Display name for the logical playback device.
    pub device_name: String,
    /// Initial player volume as a percentage in `0..=100`.
    pub initial_volume: u8,
}

impl StreamingConfig {
    /// Create a configuration with the vendor's production endpoints.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base_url: "https://api.spotify.com/v1".to_string(),
            scopes: Self::default_scopes(),
            device_name: "Lyrics Companion Player".to_string(),
            initial_volume: 50,
        }
    }

    /// Scopes required for streaming, playback state and profile access.
    pub fn default_scopes() -> Vec<String> {
        [
            "streaming",
            "user-read-email",
            "user-read-private",
            "user-read-playback-state",
            "user-modify-playback-state",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Override the authorization endpoint.
    pub fn with_authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = url.into();
        self
    }

    /// Override the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override the web API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the logical device name.
    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = name.into();
        self
    }

    /// Override the initial volume percentage.
    pub fn with_initial_volume(mut self, percent: u8) -> Self {
        self.initial_volume = percent;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "streaming client_id must not be empty".to_string(),
            ));
        }
        for (name, value) in [
            ("redirect_uri", &self.redirect_uri),
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("api_base_url", &self.api_base_url),
        ] {
            Url::parse(value).map_err(|e| {
                CoreError::InvalidConfig(format!("streaming {} is not a valid URL: {}", name, e))
            })?;
        }
        if self.scopes.is_empty() {
            return Err(CoreError::InvalidConfig(
                "streaming scopes must not be empty".to_string(),
            ));
        }
        if self.initial_volume > 100 {
            return Err(CoreError::InvalidConfig(format!(
                "initial_volume {} exceeds 100",
                self.initial_volume
            )));
        }
        Ok(())
    }
}

/// Fully validated core configuration holding the injected bridges.
#[derive(Clone)]
pub struct CoreConfig {
    /// HTTP client used for vendor web API and token calls.
    pub http_client: Arc<dyn HttpClient>,
    /// Durable key-value storage for credentials and the PKCE verifier.
    pub storage: Arc<dyn KeyValueStore>,
    /// Time source for expiry checks.
    pub clock: Arc<dyn Clock>,
    /// Vendor playback SDK wrapper.
    pub player: Arc<dyn PlayerBridge>,
    /// Streaming vendor settings.
    pub streaming: StreamingConfig,
    /// Buffer size for the core event bus.
    pub event_buffer_size: usize,
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`] with fail-fast validation.
#[derive(Default)]
pub struct CoreConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    storage: Option<Arc<dyn KeyValueStore>>,
    clock: Option<Arc<dyn Clock>>,
    player: Option<Arc<dyn PlayerBridge>>,
    streaming: Option<StreamingConfig>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn player(mut self, player: Arc<dyn PlayerBridge>) -> Self {
        self.player = Some(player);
        self
    }

    pub fn streaming(mut self, streaming: StreamingConfig) -> Self {
        self.streaming = Some(streaming);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CapabilityMissing`] when a required bridge was not
    /// provided, or [`CoreError::InvalidConfig`] for malformed streaming
    /// settings.
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = self.http_client.ok_or_else(|| CoreError::CapabilityMissing {
            capability: "HttpClient".to_string(),
            message: "No HTTP client provided. Desktop hosts: use \
                      bridge-desktop's ReqwestHttpClient."
                .to_string(),
        })?;
        let storage = self.storage.ok_or_else(|| CoreError::CapabilityMissing {
            capability: "KeyValueStore".to_string(),
            message: "No durable storage provided. Desktop hosts: use \
                      bridge-desktop's JsonFileStore."
                .to_string(),
        })?;
        let player = self.player.ok_or_else(|| CoreError::CapabilityMissing {
            capability: "PlayerBridge".to_string(),
            message: "No player bridge provided; the host must wrap the \
                      vendor playback SDK."
                .to_string(),
        })?;
        let streaming = self
            .streaming
            .ok_or_else(|| CoreError::InvalidConfig("streaming settings missing".to_string()))?;
        streaming.validate()?;

        Ok(CoreConfig {
            http_client,
            storage,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            player,
            streaming,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::player::{PlayerEventReceiver, PlayerOptions, TokenSupplier};

    struct StubHttp;

    #[async_trait]
    impl HttpClient for StubHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            unimplemented!("not exercised")
        }
    }

    struct StubStore;

    #[async_trait]
    impl KeyValueStore for StubStore {
        async fn get(&self, _key: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }
        async fn set(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn remove(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn clear_all(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct StubPlayer;

    #[async_trait]
    impl PlayerBridge for StubPlayer {
        async fn connect(
            &self,
            _options: PlayerOptions,
            _tokens: Arc<dyn TokenSupplier>,
        ) -> BridgeResult<()> {
            Ok(())
        }
        async fn disconnect(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn toggle_play(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn previous_track(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn next_track(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn set_volume(&self, _volume: f32) -> BridgeResult<()> {
            Ok(())
        }
        fn subscribe(&self) -> PlayerEventReceiver {
            tokio::sync::broadcast::channel(1).1
        }
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .http_client(Arc::new(StubHttp))
            .storage(Arc::new(StubStore))
            .player(Arc::new(StubPlayer))
            .streaming(StreamingConfig::new(
                "client-id",
                "https://app.example/callback",
            ))
    }

    #[test]
    fn test_build_with_defaults() {
        let config = full_builder().build().unwrap();
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.streaming.initial_volume, 50);
        assert_eq!(config.streaming.scopes.len(), 5);
    }

    #[test]
    fn test_missing_http_client_fails() {
        let result = CoreConfig::builder()
            .storage(Arc::new(StubStore))
            .player(Arc::new(StubPlayer))
            .streaming(StreamingConfig::new("id", "https://app.example/callback"))
            .build();

        assert!(matches!(
            result,
            Err(CoreError::CapabilityMissing { ref capability, .. }) if capability == "HttpClient"
        ));
    }

    #[test]
    fn test_empty_client_id_rejected() {
        let result = full_builder()
            .streaming(StreamingConfig::new("  ", "https://app.example/callback"))
            .build();
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let streaming = StreamingConfig::new("id", "https://app.example/callback")
            .with_token_url("not a url");
        let result = full_builder().streaming(streaming).build();
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_volume_over_100_rejected() {
        let streaming =
            StreamingConfig::new("id", "https://app.example/callback").with_initial_volume(101);
        let result = full_builder().streaming(streaming).build();
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }
}
