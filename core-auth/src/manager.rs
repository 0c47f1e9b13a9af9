//! # Authorization Manager
//!
//! High-level orchestration of the streaming vendor's PKCE authorization
//! flow: starting the redirect round-trip, completing it on the callback
//! route, validating the persisted credential, and revoking everything on
//! sign-out.
//!
//! All failures here are terminal for the current flow attempt; the user
//! restarts with [`AuthManager::begin_authorization`]. Every outcome is
//! surfaced twice: as a typed [`AuthError`] to the caller and as an
//! [`AuthEvent`] on the event bus for status text.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::error::BridgeError;
use bridge_traits::http::HttpClient;
use bridge_traits::player::TokenSupplier;
use bridge_traits::storage::KeyValueStore;
use bridge_traits::time::Clock;
use core_runtime::config::StreamingConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use url::Url;

use crate::credential::{AuthState, Credential};
use crate::error::{AuthError, Result};
use crate::oauth::{OAuthFlow, PkceVerifier};
use crate::store::CredentialStore;

/// Query parameters received on the application's callback route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// The authorization code, when the vendor granted one.
    pub code: Option<String>,
    /// The vendor's error identifier, when authorization failed or was denied.
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse from a raw query string (`code=...` or `error=...`).
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Orchestrates the PKCE flow and owns the persisted credential.
pub struct AuthManager {
    flow: OAuthFlow,
    store: CredentialStore,
    clock: Arc<dyn Clock>,
    event_bus: EventBus,
    state: RwLock<AuthState>,
}

impl AuthManager {
    pub fn new(
        streaming: StreamingConfig,
        http_client: Arc<dyn HttpClient>,
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            flow: OAuthFlow::new(streaming, http_client),
            store: CredentialStore::new(storage),
            clock,
            event_bus,
            state: RwLock::new(AuthState::SignedOut),
        }
    }

    /// Current authorization state.
    pub async fn state(&self) -> AuthState {
        *self.state.read().await
    }

    /// Start an authorization attempt.
    ///
    /// Generates a fresh PKCE verifier, persists it (overwriting any
    /// verifier from an earlier attempt), and returns the vendor
    /// authorization URL for the host to navigate to. Control leaves the
    /// application once the host follows the redirect.
    #[instrument(skip(self))]
    pub async fn begin_authorization(&self) -> Result<Url> {
        let verifier = PkceVerifier::generate();
        self.store.store_verifier(&verifier).await?;
        let url = self.flow.build_authorize_url(&verifier)?;

        *self.state.write().await = AuthState::SigningIn;
        self.event_bus
            .emit(CoreEvent::Auth(AuthEvent::SigningIn))
            .ok();
        info!("Authorization redirect prepared");

        Ok(url)
    }

    /// Complete an authorization attempt on the callback route.
    ///
    /// The stored verifier is removed before the exchange is attempted, so
    /// it cannot be replayed whatever the outcome.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthorizationDenied`] when the vendor reported an
    ///   `error` parameter (takes precedence even if a code is present)
    /// - [`AuthError::MissingCode`] when no code was delivered
    /// - [`AuthError::MissingVerifier`] when no verifier is stored (e.g.,
    ///   the flow started in a different session)
    /// - [`AuthError::TokenEndpoint`] / [`AuthError::Network`] from the
    ///   exchange itself
    #[instrument(skip(self, params))]
    pub async fn complete_authorization(&self, params: &CallbackParams) -> Result<Credential> {
        let result = self.run_completion(params).await;
        match &result {
            Ok(credential) => {
                *self.state.write().await = AuthState::SignedIn;
                self.event_bus
                    .emit(CoreEvent::Auth(AuthEvent::SignedIn {
                        expires_at: credential.expires_at.timestamp(),
                    }))
                    .ok();
            }
            Err(err) => {
                *self.state.write().await = AuthState::SignedOut;
                self.event_bus
                    .emit(CoreEvent::Auth(AuthEvent::AuthError {
                        message: err.to_string(),
                        recoverable: true,
                    }))
                    .ok();
            }
        }
        result
    }

    async fn run_completion(&self, params: &CallbackParams) -> Result<Credential> {
        if let Some(reason) = &params.error {
            warn!(error = %reason, "Authorization denied by vendor");
            self.store.clear_verifier().await?;
            return Err(AuthError::AuthorizationDenied {
                reason: reason.clone(),
            });
        }

        let code = match &params.code {
            Some(code) => code,
            None => {
                self.store.clear_verifier().await?;
                return Err(AuthError::MissingCode);
            }
        };

        let verifier = self
            .store
            .take_verifier()
            .await?
            .ok_or(AuthError::MissingVerifier)?;

        let credential = self
            .flow
            .exchange_code(code, &verifier, self.clock.now())
            .await?;
        self.store.save(&credential).await?;

        info!("Streaming credential stored");
        Ok(credential)
    }

    /// Return the stored credential if it is still valid.
    ///
    /// An expired credential is cleared and reported as absent; callers
    /// treat `None` as "not authenticated" and prompt re-authorization.
    /// Refresh tokens are stored but deliberately not used here; expiry
    /// always forces a full re-authorization.
    pub async fn valid_credential(&self) -> Result<Option<Credential>> {
        let credential = match self.store.load().await? {
            Some(credential) => credential,
            None => return Ok(None),
        };

        if credential.is_expired(self.clock.now()) {
            info!("Stored credential expired; clearing it");
            self.store.clear_credential().await?;
            *self.state.write().await = AuthState::SignedOut;
            return Ok(None);
        }

        Ok(Some(credential))
    }

    /// Clear all persisted credential and verifier state.
    ///
    /// Dependents holding a playback session observe the emitted
    /// [`AuthEvent::SignedOut`] and tear down.
    #[instrument(skip(self))]
    pub async fn revoke(&self) -> Result<()> {
        self.store.clear_all().await?;
        *self.state.write().await = AuthState::SignedOut;
        self.event_bus
            .emit(CoreEvent::Auth(AuthEvent::SignedOut))
            .ok();
        info!("Streaming credential revoked");
        Ok(())
    }
}

/// Lets the vendor SDK pull the current access token on demand, mirroring
/// the SDK's OAuth-token callback.
#[async_trait]
impl TokenSupplier for AuthManager {
    async fn access_token(&self) -> bridge_traits::error::Result<String> {
        match self.valid_credential().await {
            Ok(Some(credential)) => Ok(credential.access_token),
            Ok(None) => Err(BridgeError::NotAvailable(
                "no valid streaming credential".to_string(),
            )),
            Err(err) => Err(BridgeError::OperationFailed(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_params_from_query() {
        let params = CallbackParams::from_query("code=abc123&state=ignored");
        assert_eq!(params.code.as_deref(), Some("abc123"));
        assert!(params.error.is_none());

        let params = CallbackParams::from_query("error=access_denied");
        assert_eq!(params.error.as_deref(), Some("access_denied"));
        assert!(params.code.is_none());

        let params = CallbackParams::from_query("");
        assert_eq!(params, CallbackParams::default());
    }

    #[test]
    fn test_callback_params_decodes_percent_encoding() {
        let params = CallbackParams::from_query("error=user%20denied%20access");
        assert_eq!(params.error.as_deref(), Some("user denied access"));
    }
}
