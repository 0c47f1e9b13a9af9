//! Streaming Player Bridge
//!
//! Abstraction over the vendor's real-time playback SDK. The vendor script
//! registers a single global ready-callback and an event-listener API; this
//! trait re-architects that surface as an injected dependency with typed
//! events so multiple session instances (and tests) do not collide on global
//! state.
//!
//! Hosts construct the vendor player with a device name, an OAuth token
//! supplier, and an initial volume, then forward every vendor event into the
//! broadcast channel returned by [`PlayerBridge::subscribe`].

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::Result;

/// Options handed to the vendor SDK constructor.
#[derive(Debug, Clone)]
pub struct PlayerOptions {
    /// Display name for the logical playback device.
    pub device_name: String,
    /// Initial volume, normalized to `0.0..=1.0`.
    pub initial_volume: f32,
}

impl PlayerOptions {
    pub fn new(device_name: impl Into<String>, initial_volume: f32) -> Self {
        Self {
            device_name: device_name.into(),
            initial_volume,
        }
    }
}

/// Supplies the current OAuth access token to the vendor SDK.
///
/// The vendor invokes this whenever it needs a credential, mirroring the
/// SDK's `getOAuthToken` callback.
#[async_trait]
pub trait TokenSupplier: Send + Sync {
    /// Return a currently valid access token.
    ///
    /// # Errors
    ///
    /// Returns an error when no unexpired credential is available; the
    /// vendor will subsequently emit an authentication error event.
    async fn access_token(&self) -> Result<String>;
}

/// Track descriptor as reported by the vendor player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeTrack {
    /// Display name of the track.
    pub name: String,
    /// Performer names, primary first.
    pub artists: Vec<String>,
    /// Vendor URI for the track.
    pub uri: String,
}

/// Snapshot of the vendor player state delivered with a state-change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStateSnapshot {
    /// Whether playback is currently paused.
    pub paused: bool,
    /// The track currently loaded, if any.
    pub current_track: Option<BridgeTrack>,
}

/// Typed variant per vendor event name.
///
/// Events are delivered in the order the vendor emits them and applied
/// without reordering; a later event always overwrites an earlier one's
/// effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The logical device connected and was assigned an identifier.
    Ready { device_id: String },
    /// The device went offline; the session may reconnect.
    NotReady { device_id: String },
    /// The player's paused flag or loaded track changed.
    StateChanged(PlayerStateSnapshot),
    /// The vendor SDK failed to initialize.
    InitializationError { message: String },
    /// The credential was rejected by the vendor.
    AuthenticationError { message: String },
    /// The account cannot use this playback surface.
    AccountError { message: String },
    /// A playback command failed inside the vendor player.
    PlaybackError { message: String },
}

/// Receiver half of the player event channel.
pub type PlayerEventReceiver = broadcast::Receiver<PlayerEvent>;

/// Host-implemented wrapper around the vendor playback SDK.
///
/// All methods map one-to-one onto the vendor player object. Implementations
/// must deliver vendor events through [`subscribe`](Self::subscribe) in
/// arrival order.
#[async_trait]
pub trait PlayerBridge: Send + Sync {
    /// Construct and connect the vendor player.
    ///
    /// The token supplier is retained for the lifetime of the connection and
    /// consulted whenever the vendor requests a credential.
    async fn connect(&self, options: PlayerOptions, tokens: Arc<dyn TokenSupplier>) -> Result<()>;

    /// Disconnect and release the vendor player.
    async fn disconnect(&self) -> Result<()>;

    /// Toggle the vendor player's pause state.
    async fn toggle_play(&self) -> Result<()>;

    /// Skip to the previous track in the vendor queue.
    async fn previous_track(&self) -> Result<()>;

    /// Skip to the next track in the vendor queue.
    async fn next_track(&self) -> Result<()>;

    /// Set the player volume, normalized to `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Subscribe to vendor events.
    ///
    /// Each call returns an independent receiver; events are broadcast to
    /// all receivers.
    fn subscribe(&self) -> PlayerEventReceiver;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_options() {
        let options = PlayerOptions::new("Companion Web Player", 0.5);
        assert_eq!(options.device_name, "Companion Web Player");
        assert_eq!(options.initial_volume, 0.5);
    }

    #[test]
    fn test_state_snapshot_equality() {
        let a = PlayerStateSnapshot {
            paused: true,
            current_track: Some(BridgeTrack {
                name: "Amach Anocht".into(),
                artists: vec!["KNEECAP".into()],
                uri: "vendor:track:123".into(),
            }),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_events_broadcast_in_order() {
        let (tx, mut rx) = broadcast::channel(8);
        tx.send(PlayerEvent::Ready {
            device_id: "dev-1".into(),
        })
        .unwrap();
        tx.send(PlayerEvent::NotReady {
            device_id: "dev-1".into(),
        })
        .unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            PlayerEvent::Ready {
                device_id: "dev-1".into()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            PlayerEvent::NotReady {
                device_id: "dev-1".into()
            }
        );
    }
}
