//! OAuth 2.0 Authorization-Code Flow with PKCE
//!
//! Implements the public-client (secret-less) variant of RFC 6749 with
//! RFC 7636 proof-of-key exchange against the streaming vendor:
//! - building the authorization URL with an S256 challenge
//! - exchanging the callback's authorization code for a credential
//!
//! # Security
//!
//! - The code verifier carries at least 32 bytes of entropy and only its
//!   SHA-256 challenge leaves the client before the exchange.
//! - Sensitive values (tokens, codes, verifiers) are never logged.
//! - No client secret exists anywhere in this flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use core_runtime::config::StreamingConfig;
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{instrument, warn};
use url::Url;

use crate::credential::Credential;
use crate::error::{AuthError, Result};

/// PKCE (Proof Key for Code Exchange) verifier.
///
/// Generated immediately before the authorization redirect, persisted
/// transiently, and consumed exactly once by the token exchange. Each new
/// authorization attempt overwrites the stored verifier, so a code issued
/// for one attempt can never be exchanged with another attempt's verifier.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceVerifier {
    verifier: String,
}

impl PkceVerifier {
    /// Create a verifier from 32 bytes of cryptographically secure
    /// randomness, base64-url-encoded without padding (43 characters,
    /// within the 43-128 range required by RFC 7636).
    pub fn generate() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::thread_rng().fill(&mut verifier_bytes);
        Self {
            verifier: URL_SAFE_NO_PAD.encode(verifier_bytes),
        }
    }

    /// Reconstruct a verifier previously persisted with [`Self::as_str`].
    pub fn from_stored(verifier: impl Into<String>) -> Self {
        Self {
            verifier: verifier.into(),
        }
    }

    /// The verifier string, as sent to the token endpoint.
    pub fn as_str(&self) -> &str {
        &self.verifier
    }

    /// Compute the code challenge: BASE64URL(SHA256(verifier)).
    pub fn challenge(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

impl std::fmt::Debug for PkceVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceVerifier")
            .field("verifier", &"[REDACTED]")
            .finish()
    }
}

/// Token response from the vendor token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    refresh_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> i64 {
    3600
}

/// Error body returned by the vendor token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// OAuth authorization-code flow against the streaming vendor.
pub struct OAuthFlow {
    streaming: StreamingConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlow {
    pub fn new(streaming: StreamingConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            streaming,
            http_client,
        }
    }

    /// Build the vendor authorization URL for the given verifier.
    ///
    /// The caller redirects the user agent to the returned URL; control
    /// leaves the application until the vendor redirects back to the
    /// callback route.
    #[instrument(skip(self, verifier))]
    pub fn build_authorize_url(&self, verifier: &PkceVerifier) -> Result<Url> {
        let mut url = Url::parse(&self.streaming.authorize_url)
            .map_err(|e| AuthError::InvalidEndpoint(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("response_type", "code");
            query.append_pair("client_id", &self.streaming.client_id);
            query.append_pair("scope", &self.streaming.scopes.join(" "));
            query.append_pair("redirect_uri", &self.streaming.redirect_uri);
            query.append_pair("code_challenge_method", "S256");
            query.append_pair("code_challenge", &verifier.challenge());
        }

        tracing::debug!("Built streaming authorization URL");

        Ok(url)
    }

    /// Exchange an authorization code and verifier for a credential.
    ///
    /// Sends the form-encoded `authorization_code` grant without a client
    /// secret, per PKCE for public clients. `issued_at` is used to compute
    /// the credential's absolute expiry from the vendor-reported lifetime.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenEndpoint`] when the vendor rejects the exchange
    /// (the vendor's own description is surfaced when present), or
    /// [`AuthError::Network`] for transport failures.
    #[instrument(skip(self, code, verifier, issued_at))]
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &PkceVerifier,
        issued_at: DateTime<Utc>,
    ) -> Result<Credential> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.streaming.redirect_uri.as_str()),
            ("client_id", self.streaming.client_id.as_str()),
            ("code_verifier", verifier.as_str()),
        ];

        let encoded_body = serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::Network(format!("failed to encode token request: {}", e)))?;

        let request = HttpRequest::new(HttpMethod::Post, self.streaming.token_url.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Bytes::from(encoded_body));

        tracing::debug!("Exchanging authorization code for tokens");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.is_success() {
            let message = match response.json::<TokenErrorResponse>() {
                Ok(body) => body
                    .error_description
                    .or(body.error)
                    .unwrap_or_else(|| "unknown token endpoint error".to_string()),
                Err(_) => response
                    .text()
                    .unwrap_or_else(|_| "unreadable error response".to_string()),
            };

            warn!(
                status = response.status,
                error = %message,
                "Token exchange rejected"
            );

            return Err(AuthError::TokenEndpoint {
                status: response.status,
                message,
            });
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Network(format!("failed to parse token response: {}", e)))?;

        tracing::info!(
            expires_in = token_response.expires_in,
            "Authorization code exchanged"
        );

        Ok(Credential::from_token_response(
            token_response.access_token,
            token_response.token_type,
            token_response.expires_in,
            token_response.refresh_token,
            issued_at,
        ))
    }
}
