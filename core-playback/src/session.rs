//! # Playback Session
//!
//! Maintains one connected logical playback device against the vendor's
//! real-time SDK and exposes transport controls, reconciling local state
//! with asynchronous vendor-pushed events.
//!
//! ## State machine
//!
//! ```text
//! Unauthenticated --connect()--> Initializing --ready--> Ready
//!       ^                             ^                    |
//!       |                             +---- not_ready -----+
//!       |                             |
//!       |                             +-- init/account error --> Failed
//!       +---- authentication error / sign-out (full teardown)
//! ```
//!
//! Vendor events are applied in arrival order without debouncing; a later
//! event always overwrites an earlier one's effect. Overlapping transport
//! commands may race, and the last vendor event wins; this is an accepted
//! race, not a serialized queue.
//!
//! Transport commands issued while the session is not `Ready` are rejected
//! as no-ops (never queued) and produce no vendor call.

use std::sync::Arc;

use bridge_traits::player::{PlayerBridge, PlayerEvent, PlayerOptions, TokenSupplier};
use core_auth::AuthManager;
use core_runtime::config::CoreConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus, PlaybackEvent, RecvError};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{PlaybackError, Result};
use crate::remote::RemoteControl;
use crate::resolver::TrackResolver;
use crate::types::{
    clamp_volume_percent, percent_to_vendor_volume, CommandOutcome, SessionState, TrackRef,
};

struct Inner {
    state: SessionState,
    paused: bool,
    current_track: Option<TrackRef>,
    device_id: Option<String>,
    volume: u8,
}

/// One application-side playback session over the vendor SDK.
pub struct PlaybackSession {
    bridge: Arc<dyn PlayerBridge>,
    remote: RemoteControl,
    resolver: TrackResolver,
    auth: Arc<AuthManager>,
    event_bus: EventBus,
    device_name: String,
    instance: Uuid,
    inner: RwLock<Inner>,
}

impl PlaybackSession {
    pub fn new(
        bridge: Arc<dyn PlayerBridge>,
        auth: Arc<AuthManager>,
        remote: RemoteControl,
        resolver: TrackResolver,
        device_name: impl Into<String>,
        initial_volume: u8,
        event_bus: EventBus,
    ) -> Self {
        Self {
            bridge,
            remote,
            resolver,
            auth,
            event_bus,
            device_name: device_name.into(),
            instance: Uuid::new_v4(),
            inner: RwLock::new(Inner {
                state: SessionState::Unauthenticated,
                paused: true,
                current_track: None,
                device_id: None,
                volume: clamp_volume_percent(i32::from(initial_volume)),
            }),
        }
    }

    /// Wire a session from a validated [`CoreConfig`].
    pub fn from_config(config: &CoreConfig, auth: Arc<AuthManager>, event_bus: EventBus) -> Self {
        let remote = RemoteControl::new(
            config.http_client.clone(),
            auth.clone(),
            config.streaming.api_base_url.clone(),
        );
        let resolver = TrackResolver::new(
            config.http_client.clone(),
            auth.clone(),
            config.streaming.api_base_url.clone(),
        );
        Self::new(
            config.player.clone(),
            auth,
            remote,
            resolver,
            config.streaming.device_name.clone(),
            config.streaming.initial_volume,
            event_bus,
        )
    }

    /// Current session state.
    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state
    }

    /// Vendor-assigned device identifier, once `Ready` has been observed.
    pub async fn device_id(&self) -> Option<String> {
        self.inner.read().await.device_id.clone()
    }

    /// The track currently loaded, if any.
    pub async fn current_track(&self) -> Option<TrackRef> {
        self.inner.read().await.current_track.clone()
    }

    /// Whether the vendor player reports paused.
    pub async fn is_paused(&self) -> bool {
        self.inner.read().await.paused
    }

    /// Current volume percentage.
    pub async fn volume(&self) -> u8 {
        self.inner.read().await.volume
    }

    /// Start the vendor SDK connection.
    ///
    /// Requires a valid credential; moves the session to `Initializing`.
    /// The `Ready` transition arrives later as a vendor event.
    #[instrument(skip(self), fields(session = %self.instance))]
    pub async fn connect(&self) -> Result<()> {
        if self.auth.valid_credential().await?.is_none() {
            return Err(PlaybackError::NotAuthenticated);
        }

        let volume = self.inner.read().await.volume;
        {
            let mut inner = self.inner.write().await;
            inner.state = SessionState::Initializing;
        }
        self.event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::Connecting))
            .ok();

        let tokens: Arc<dyn TokenSupplier> = self.auth.clone();
        let options = PlayerOptions::new(
            self.device_name.clone(),
            percent_to_vendor_volume(volume),
        );
        self.bridge.connect(options, tokens).await?;

        info!("Vendor player connecting");
        Ok(())
    }

    /// Drive the session from vendor events and sign-out notifications.
    ///
    /// Runs until the player event channel closes or the credential is
    /// revoked; after a sign-out the session object is discarded.
    pub async fn run(&self) {
        let mut player_events = self.bridge.subscribe();
        let mut core_events = self.event_bus.subscribe();

        loop {
            tokio::select! {
                event = player_events.recv() => match event {
                    Ok(event) => self.handle_event(event).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Player event receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                event = core_events.recv() => match event {
                    Ok(CoreEvent::Auth(AuthEvent::SignedOut)) => {
                        self.teardown().await;
                        break;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
            }
        }
    }

    /// Apply one vendor event to the session.
    ///
    /// Events are applied in the order delivered; there is no reordering or
    /// debouncing.
    #[instrument(skip(self, event), fields(session = %self.instance))]
    pub async fn handle_event(&self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready { device_id } => {
                let mut inner = self.inner.write().await;
                inner.state = SessionState::Ready;
                if inner.device_id.is_none() {
                    inner.device_id = Some(device_id.clone());
                } else if inner.device_id.as_deref() != Some(device_id.as_str()) {
                    // Device identity is stable for the session's lifetime.
                    warn!(
                        existing = inner.device_id.as_deref().unwrap_or_default(),
                        reported = %device_id,
                        "Vendor reported a different device id; keeping the original"
                    );
                }
                drop(inner);
                info!(device_id = %device_id, "Playback device ready");
                self.event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::SessionReady {
                        device_id,
                    }))
                    .ok();
            }
            PlayerEvent::NotReady { device_id } => {
                self.inner.write().await.state = SessionState::Initializing;
                info!(device_id = %device_id, "Playback device went offline");
                self.event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::SessionOffline {
                        device_id,
                    }))
                    .ok();
            }
            PlayerEvent::StateChanged(snapshot) => {
                let mut inner = self.inner.write().await;
                inner.paused = snapshot.paused;
                inner.current_track = snapshot.current_track.map(TrackRef::from);
                let event = if inner.paused {
                    PlaybackEvent::Paused
                } else {
                    PlaybackEvent::Playing {
                        track: inner.current_track.as_ref().map(|t| t.name.clone()),
                    }
                };
                drop(inner);
                self.event_bus.emit(CoreEvent::Playback(event)).ok();
            }
            PlayerEvent::InitializationError { message } => {
                error!(error = %message, "Failed to initialize vendor player");
                self.inner.write().await.state = SessionState::Failed;
                self.emit_error("initialization", message);
            }
            PlayerEvent::AccountError { message } => {
                error!(error = %message, "Failed to validate streaming account");
                self.inner.write().await.state = SessionState::Failed;
                self.emit_error("account", message);
            }
            PlayerEvent::PlaybackError { message } => {
                error!(error = %message, "Failed to perform playback");
                self.emit_error("playback", message);
            }
            PlayerEvent::AuthenticationError { message } => {
                // The session cannot self-heal without a new token: clear the
                // credential and discard the connection.
                error!(error = %message, "Vendor rejected the credential");
                if let Err(err) = self.auth.revoke().await {
                    warn!(error = %err, "Failed to clear credential state");
                }
                self.teardown().await;
                self.emit_error("authentication", message);
            }
        }
    }

    /// Toggle between playing and paused.
    ///
    /// When nothing is loaded yet and a target (track name, performer) is
    /// supplied, the target is resolved and played first; otherwise the
    /// vendor player's pause state is toggled and the resulting state-change
    /// event updates local state.
    #[instrument(skip(self, target), fields(session = %self.instance))]
    pub async fn toggle_play_pause(&self, target: Option<(&str, &str)>) -> Result<CommandOutcome> {
        let (ready, needs_load) = {
            let inner = self.inner.read().await;
            (inner.state.is_ready(), inner.current_track.is_none())
        };
        if !ready {
            return Ok(CommandOutcome::Rejected);
        }

        if needs_load {
            if let Some((name, artist)) = target {
                let resolved = self
                    .resolver
                    .resolve(name, artist)
                    .await?
                    .ok_or_else(|| PlaybackError::TrackNotFound {
                        name: name.to_string(),
                    })?;
                let device_id = self
                    .device_id()
                    .await
                    .ok_or(PlaybackError::NoDevice)?;
                self.remote.play_track(&resolved.uri, &device_id).await?;

                let mut inner = self.inner.write().await;
                inner.current_track = Some(resolved.clone());
                inner.paused = false;
                drop(inner);
                self.event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::Playing {
                        track: Some(resolved.name),
                    }))
                    .ok();
                return Ok(CommandOutcome::Dispatched);
            }
        }

        self.bridge.toggle_play().await?;
        Ok(CommandOutcome::Dispatched)
    }

    /// Skip to the previous track in the vendor queue.
    pub async fn skip_previous(&self) -> Result<CommandOutcome> {
        if !self.state().await.is_ready() {
            return Ok(CommandOutcome::Rejected);
        }
        self.bridge.previous_track().await?;
        Ok(CommandOutcome::Dispatched)
    }

    /// Skip to the next track in the vendor queue.
    pub async fn skip_next(&self) -> Result<CommandOutcome> {
        if !self.state().await.is_ready() {
            return Ok(CommandOutcome::Rejected);
        }
        self.bridge.next_track().await?;
        Ok(CommandOutcome::Dispatched)
    }

    /// Set the volume from a percentage in `[0, 100]`.
    ///
    /// Out-of-range input is clamped to the nearest bound before being
    /// converted to the vendor's `0.0..=1.0` scale.
    #[instrument(skip(self), fields(session = %self.instance))]
    pub async fn set_volume(&self, level: i32) -> Result<CommandOutcome> {
        if !self.state().await.is_ready() {
            return Ok(CommandOutcome::Rejected);
        }

        let percent = clamp_volume_percent(level);
        self.bridge
            .set_volume(percent_to_vendor_volume(percent))
            .await?;
        self.inner.write().await.volume = percent;
        self.event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged { percent }))
            .ok();
        Ok(CommandOutcome::Dispatched)
    }

    /// Start playback of a specific vendor track URI on this device.
    ///
    /// Delegates to the web API remote, which performs the bounded
    /// device-transfer retry when the vendor reports no active device.
    #[instrument(skip(self), fields(session = %self.instance))]
    pub async fn play_track_by_uri(&self, uri: &str) -> Result<CommandOutcome> {
        if !self.state().await.is_ready() {
            return Ok(CommandOutcome::Rejected);
        }
        let device_id = self.device_id().await.ok_or(PlaybackError::NoDevice)?;
        self.remote.play_track(uri, &device_id).await?;
        Ok(CommandOutcome::Dispatched)
    }

    /// Disconnect the vendor player and reset to `Unauthenticated`.
    ///
    /// Idempotent; called on sign-out and on authentication errors.
    pub async fn teardown(&self) {
        if let Err(err) = self.bridge.disconnect().await {
            warn!(error = %err, "Vendor player disconnect failed");
        }
        let mut inner = self.inner.write().await;
        inner.state = SessionState::Unauthenticated;
        inner.paused = true;
        inner.current_track = None;
        inner.device_id = None;
    }

    fn emit_error(&self, category: &str, message: String) {
        self.event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::Error {
                category: category.to_string(),
                message,
            }))
            .ok();
    }
}
