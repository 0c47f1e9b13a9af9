use thiserror::Error;

use bridge_traits::error::BridgeError;
use core_auth::AuthError;

/// Playback failures.
///
/// Variant `Display` text is user-facing. "Not found" outcomes from track
/// resolution are not errors (the resolver returns `Ok(None)`); only
/// transport, authorization and vendor-command failures appear here.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Not connected to the streaming service")]
    NotAuthenticated,

    #[error("No playback device is available for this session")]
    NoDevice,

    #[error("Track not found: {name}")]
    TrackNotFound { name: String },

    #[error("Playback request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to perform playback: {0}")]
    Command(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Player bridge error: {0}")]
    Bridge(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
