//! # Event Bus System
//!
//! Provides an event-driven architecture for the Lyrics Companion Core using
//! `tokio::sync::broadcast`. Core modules publish typed events; host UIs
//! subscribe to drive status text and player chrome.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
//!
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Auth(AuthEvent::SigningIn))
//!     .ok();
//! ```
//!
//! ## Error Handling
//!
//! Subscribers receive `RecvError::Lagged(n)` when they fall behind; this is
//! non-fatal and the subscriber keeps receiving newer events. `RecvError::Closed`
//! means every sender was dropped and signals shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Authorization-related events
    Auth(AuthEvent),
    /// Playback-session-related events
    Playback(PlaybackEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Auth(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Auth(AuthEvent::AuthError { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Auth(AuthEvent::SignedIn { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::SessionReady { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

/// Events related to the vendor authorization flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// Authorization redirect round-trip started.
    SigningIn,
    /// Credential obtained and persisted.
    SignedIn {
        /// Timestamp when the access token expires (Unix epoch seconds).
        expires_at: i64,
    },
    /// Credential and verifier state cleared.
    SignedOut,
    /// Authorization failed.
    AuthError {
        /// Human-readable error message, surfaced to the user.
        message: String,
        /// Whether restarting the flow can succeed (e.g., user denied consent).
        recoverable: bool,
    },
}

impl AuthEvent {
    fn description(&self) -> &str {
        match self {
            AuthEvent::SigningIn => "Authorization in progress",
            AuthEvent::SignedIn { .. } => "Connected to streaming service",
            AuthEvent::SignedOut => "Disconnected from streaming service",
            AuthEvent::AuthError { .. } => "Authorization error",
        }
    }
}

/// Events related to the playback session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// Vendor SDK connection started.
    Connecting,
    /// The logical device is ready for transport commands.
    SessionReady {
        /// Vendor-assigned device identifier.
        device_id: String,
    },
    /// The device went offline; reconnection is possible.
    SessionOffline {
        /// The device that went offline.
        device_id: String,
    },
    /// Playback started or resumed.
    Playing {
        /// Display name of the current track, when known.
        track: Option<String>,
    },
    /// Playback paused.
    Paused,
    /// Volume changed through the session.
    VolumeChanged {
        /// New volume as a percentage in `0..=100`.
        percent: u8,
    },
    /// A vendor-reported or command error.
    Error {
        /// Error category: "initialization", "authentication", "account" or "playback".
        category: String,
        /// Human-readable error message, surfaced to the user.
        message: String,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Connecting => "Connecting playback device",
            PlaybackEvent::SessionReady { .. } => "Playback device ready",
            PlaybackEvent::SessionOffline { .. } => "Playback device offline",
            PlaybackEvent::Playing { .. } => "Playback started",
            PlaybackEvent::Paused => "Playback paused",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

/// Central broadcast channel for publishing core events.
///
/// Cloning an `EventBus` clones the sender half; all clones feed the same
/// subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer size.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of subscribers that received the event. An error
    /// means there were no subscribers, which is not a failure for emitters;
    /// callers typically `.ok()` the result.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        tracing::trace!(event = event.description(), "Emitting core event");
        self.sender.send(event)
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}
