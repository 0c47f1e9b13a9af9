//! Vendor Web API transport for playback control.
//!
//! The real-time SDK handles toggles and skips on its own; starting playback
//! of a specific track URI goes through the vendor's web API instead, scoped
//! to this session's device. When the vendor answers "no active device"
//! (404 class), the device is transferred to this session and the play
//! request retried exactly once under an explicit [`RetryPolicy`], so the
//! bound is independently testable.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
use core_auth::AuthManager;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::error::{PlaybackError, Result};

/// Fixed wait between the device transfer and the retried play request,
/// giving the vendor time to activate the device.
const TRANSFER_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Serialize)]
struct PlayBody<'a> {
    uris: [&'a str; 1],
}

#[derive(Serialize)]
struct TransferBody<'a> {
    device_ids: [&'a str; 1],
    play: bool,
}

/// Playback commands against the vendor web API.
pub struct RemoteControl {
    http_client: Arc<dyn HttpClient>,
    auth: Arc<AuthManager>,
    api_base_url: String,
    retry: RetryPolicy,
}

impl RemoteControl {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        auth: Arc<AuthManager>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            auth,
            api_base_url: api_base_url.into(),
            retry: RetryPolicy::once_after(TRANSFER_SETTLE_DELAY),
        }
    }

    /// Override the transfer-then-retry policy. Tests use a zero delay.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn bearer(&self) -> Result<String> {
        match self.auth.valid_credential().await? {
            Some(credential) => Ok(credential.access_token),
            None => Err(PlaybackError::NotAuthenticated),
        }
    }

    /// Start playback of `uri` on the given device.
    ///
    /// A "no active device" response triggers one device transfer followed
    /// by exactly one retried play request after a fixed delay. Any second
    /// failure is surfaced without further attempts.
    #[instrument(skip(self), fields(device_id = %device_id))]
    pub async fn play_track(&self, uri: &str, device_id: &str) -> Result<()> {
        let token = self.bearer().await?;

        let mut attempt = 1u32;
        loop {
            let response = self.send_play(uri, device_id, &token).await?;
            if response.is_success() {
                return Ok(());
            }

            if response.is_not_found() && attempt < self.retry.max_attempts {
                warn!(
                    attempt,
                    "No active playback device; transferring and retrying"
                );
                self.transfer_to_device(device_id, &token).await?;
                tokio::time::sleep(self.retry.delay_before(attempt)).await;
                attempt += 1;
                continue;
            }

            return Err(api_error(&response));
        }
    }

    async fn send_play(&self, uri: &str, device_id: &str, token: &str) -> Result<HttpResponse> {
        let url = format!(
            "{}/me/player/play?device_id={}",
            self.api_base_url, device_id
        );
        let request = HttpRequest::new(HttpMethod::Put, url)
            .bearer_token(token)
            .json(&PlayBody { uris: [uri] })
            .map_err(|e| PlaybackError::Network(e.to_string()))?;

        self.http_client
            .execute(request)
            .await
            .map_err(|e| PlaybackError::Network(e.to_string()))
    }

    /// Transfer playback to the given device without starting playback.
    async fn transfer_to_device(&self, device_id: &str, token: &str) -> Result<()> {
        let url = format!("{}/me/player", self.api_base_url);
        let request = HttpRequest::new(HttpMethod::Put, url)
            .bearer_token(token)
            .json(&TransferBody {
                device_ids: [device_id],
                play: false,
            })
            .map_err(|e| PlaybackError::Network(e.to_string()))?;

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| PlaybackError::Network(e.to_string()))?;

        if !response.is_success() {
            return Err(api_error(&response));
        }
        Ok(())
    }
}

fn api_error(response: &HttpResponse) -> PlaybackError {
    let message = response
        .text()
        .ok()
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "vendor playback request failed".to_string());
    PlaybackError::Api {
        status: response.status,
        message,
    }
}
