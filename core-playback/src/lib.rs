//! # Playback Module
//!
//! Wraps the streaming vendor's real-time playback SDK behind a typed
//! session with explicit lifecycle states, plus the web-API pieces the SDK
//! does not cover: resolving display names to track URIs and starting
//! playback of a specific URI on this session's device.
//!
//! ## Overview
//!
//! - [`PlaybackSession`] - lifecycle state machine and transport controls
//! - [`RemoteControl`] - play-by-URI with a bounded device-transfer retry
//! - [`TrackResolver`] - (track, performer) to vendor track reference
//!
//! The session depends on `core-auth` for a valid credential and tears
//! itself down when the credential is revoked or rejected.

pub mod error;
pub mod remote;
pub mod resolver;
pub mod session;
pub mod types;

pub use error::{PlaybackError, Result};
pub use remote::RemoteControl;
pub use resolver::TrackResolver;
pub use session::PlaybackSession;
pub use types::{
    clamp_volume_percent, percent_to_vendor_volume, CommandOutcome, SessionState, TrackRef,
};
