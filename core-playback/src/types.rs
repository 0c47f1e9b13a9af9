use bridge_traits::player::BridgeTrack;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a playback session.
///
/// # State Transitions
///
/// ```text
/// Unauthenticated -> Initializing -> Ready
///        ^                ^            |
///        |                +------------+  (device offline)
///        |                |
///        |                v
///        |             Failed           (initialization/account error)
///        +--- (credential teardown, from any state)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// No valid credential; the vendor SDK has not been started.
    #[default]
    Unauthenticated,
    /// The vendor SDK is connecting, or the device went offline and may
    /// come back.
    Initializing,
    /// The logical device is connected and accepts transport commands.
    Ready,
    /// The vendor reported an initialization or account error; recovery
    /// requires re-authorization or a fresh session instance.
    Failed,
}

impl SessionState {
    /// Whether transport commands are accepted in this state.
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Initializing => write!(f, "initializing"),
            SessionState::Ready => write!(f, "ready"),
            SessionState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a transport command.
///
/// Commands issued while the session is not [`SessionState::Ready`] are
/// rejected as no-ops rather than queued or raised as errors; the variant
/// lets callers (and tests) distinguish the two without treating rejection
/// as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was forwarded to the vendor.
    Dispatched,
    /// The session was not ready; nothing was sent.
    Rejected,
}

impl CommandOutcome {
    pub fn was_dispatched(&self) -> bool {
        matches!(self, CommandOutcome::Dispatched)
    }
}

/// Resolved reference to a vendor track.
///
/// Immutable once obtained; a new search supersedes rather than mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    /// Display name of the track.
    pub name: String,
    /// Performer names, primary first.
    pub artists: Vec<String>,
    /// Vendor URI, e.g. `spotify:track:<id>`.
    pub uri: String,
    /// Vendor identifier (the last URI segment).
    pub id: String,
}

impl TrackRef {
    /// Primary performer name, when known.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(String::as_str)
    }
}

impl From<BridgeTrack> for TrackRef {
    fn from(track: BridgeTrack) -> Self {
        let id = track
            .uri
            .rsplit(':')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            name: track.name,
            artists: track.artists,
            uri: track.uri,
            id,
        }
    }
}

/// Clamp a requested volume level to the `0..=100` percent range.
///
/// Out-of-range input is clamped, not rejected.
pub fn clamp_volume_percent(level: i32) -> u8 {
    level.clamp(0, 100) as u8
}

/// Convert a percentage volume to the vendor's `0.0..=1.0` scale.
pub fn percent_to_vendor_volume(percent: u8) -> f32 {
    f32::from(percent) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ready_accepts_commands() {
        assert!(SessionState::Ready.is_ready());
        assert!(!SessionState::Unauthenticated.is_ready());
        assert!(!SessionState::Initializing.is_ready());
        assert!(!SessionState::Failed.is_ready());
    }

    #[test]
    fn test_clamp_volume_percent() {
        assert_eq!(clamp_volume_percent(-5), 0);
        assert_eq!(clamp_volume_percent(0), 0);
        assert_eq!(clamp_volume_percent(65), 65);
        assert_eq!(clamp_volume_percent(100), 100);
        assert_eq!(clamp_volume_percent(150), 100);
    }

    #[test]
    fn test_percent_to_vendor_volume() {
        assert_eq!(percent_to_vendor_volume(0), 0.0);
        assert_eq!(percent_to_vendor_volume(50), 0.5);
        assert_eq!(percent_to_vendor_volume(100), 1.0);
    }

    #[test]
    fn test_track_ref_from_bridge_track() {
        let track = BridgeTrack {
            name: "C.E.A.R.T.A".into(),
            artists: vec!["KNEECAP".into()],
            uri: "spotify:track:3rrqgkkALSklyiSds2".into(),
        };
        let track_ref = TrackRef::from(track);
        assert_eq!(track_ref.id, "3rrqgkkALSklyiSds2");
        assert_eq!(track_ref.primary_artist(), Some("KNEECAP"));
    }
}
