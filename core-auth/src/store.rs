//! Credential persistence over the host's durable key-value storage.
//!
//! Each credential field lives under its own well-known key, mirroring the
//! storage layout of the web client. All keys are cleared together on
//! sign-out; the verifier key is transient and consumed by the exchange.

use std::sync::Arc;

use bridge_traits::storage::KeyValueStore;
use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::credential::Credential;
use crate::error::Result;
use crate::oauth::PkceVerifier;

/// Storage key for the access token.
pub const KEY_ACCESS_TOKEN: &str = "streaming_access_token";
/// Storage key for the token type.
pub const KEY_TOKEN_TYPE: &str = "streaming_token_type";
/// Storage key for the absolute expiry instant (Unix epoch seconds).
pub const KEY_EXPIRES_AT: &str = "streaming_expires_at";
/// Storage key for the refresh token.
pub const KEY_REFRESH_TOKEN: &str = "streaming_refresh_token";
/// Storage key for the transient PKCE code verifier.
pub const KEY_CODE_VERIFIER: &str = "streaming_code_verifier";

/// Typed access to the persisted credential and verifier state.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Persist a credential under the well-known keys.
    ///
    /// An absent refresh token removes any previously stored one so stale
    /// values cannot outlive the credential they belonged to.
    pub async fn save(&self, credential: &Credential) -> Result<()> {
        self.storage
            .set(KEY_ACCESS_TOKEN, &credential.access_token)
            .await?;
        self.storage
            .set(KEY_TOKEN_TYPE, &credential.token_type)
            .await?;
        self.storage
            .set(KEY_EXPIRES_AT, &credential.expires_at.timestamp().to_string())
            .await?;
        match &credential.refresh_token {
            Some(refresh) => self.storage.set(KEY_REFRESH_TOKEN, refresh).await?,
            None => self.storage.remove(KEY_REFRESH_TOKEN).await?,
        }
        Ok(())
    }

    /// Load the stored credential without checking expiry.
    ///
    /// Returns `None` when no credential is stored. A malformed record
    /// (e.g., an unparseable expiry) is cleared and reported as absent
    /// rather than propagated.
    pub async fn load(&self) -> Result<Option<Credential>> {
        let access_token = match self.storage.get(KEY_ACCESS_TOKEN).await? {
            Some(token) => token,
            None => return Ok(None),
        };
        let token_type = self
            .storage
            .get(KEY_TOKEN_TYPE)
            .await?
            .unwrap_or_else(|| "Bearer".to_string());
        let expires_at = match self.load_expiry().await? {
            Some(expires_at) => expires_at,
            None => {
                warn!("Stored credential has no usable expiry; clearing it");
                self.clear_credential().await?;
                return Ok(None);
            }
        };
        let refresh_token = self.storage.get(KEY_REFRESH_TOKEN).await?;

        Ok(Some(Credential {
            access_token,
            token_type,
            expires_at,
            refresh_token,
        }))
    }

    async fn load_expiry(&self) -> Result<Option<DateTime<Utc>>> {
        let raw = match self.storage.get(KEY_EXPIRES_AT).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let seconds = match raw.parse::<i64>() {
            Ok(seconds) => seconds,
            Err(_) => return Ok(None),
        };
        Ok(Utc.timestamp_opt(seconds, 0).single())
    }

    /// Remove the credential keys, leaving any verifier untouched.
    pub async fn clear_credential(&self) -> Result<()> {
        self.storage.remove(KEY_ACCESS_TOKEN).await?;
        self.storage.remove(KEY_TOKEN_TYPE).await?;
        self.storage.remove(KEY_EXPIRES_AT).await?;
        self.storage.remove(KEY_REFRESH_TOKEN).await?;
        Ok(())
    }

    /// Persist the PKCE verifier, replacing any verifier from an earlier
    /// authorization attempt.
    pub async fn store_verifier(&self, verifier: &PkceVerifier) -> Result<()> {
        self.storage.set(KEY_CODE_VERIFIER, verifier.as_str()).await?;
        Ok(())
    }

    /// Retrieve and delete the stored verifier in one step.
    ///
    /// The verifier is single-use: whatever the exchange outcome, it must
    /// not remain available for replay.
    pub async fn take_verifier(&self) -> Result<Option<PkceVerifier>> {
        Ok(self
            .storage
            .take(KEY_CODE_VERIFIER)
            .await?
            .map(PkceVerifier::from_stored))
    }

    /// Remove the verifier without reading it.
    pub async fn clear_verifier(&self) -> Result<()> {
        self.storage.remove(KEY_CODE_VERIFIER).await?;
        Ok(())
    }

    /// Remove every credential and verifier key.
    pub async fn clear_all(&self) -> Result<()> {
        self.clear_credential().await?;
        self.clear_verifier().await?;
        Ok(())
    }
}
