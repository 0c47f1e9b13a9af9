use chrono::{DateTime, Utc};
use std::fmt;

/// Access credential for the streaming vendor.
///
/// Owned exclusively by the authorization manager. A credential is only ever
/// replaced by a successful token exchange or destroyed on sign-out; its
/// fields never mutate in place.
///
/// # Security
///
/// Tokens must never be logged. The `Debug` implementation redacts them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Bearer token for vendor API requests.
    pub access_token: String,
    /// Token type as reported by the vendor, normally "Bearer".
    pub token_type: String,
    /// Absolute expiry instant (UTC), computed as issue time plus the
    /// vendor-reported lifetime.
    pub expires_at: DateTime<Utc>,
    /// Refresh token, when the vendor issued one. Stored but not currently
    /// used for silent refresh; expiry forces full re-authorization.
    pub refresh_token: Option<String>,
}

impl Credential {
    /// Build a credential from a token-endpoint response.
    ///
    /// `expires_in` is the vendor-reported lifetime in seconds; `issued_at`
    /// is the moment the exchange completed.
    pub fn from_token_response(
        access_token: String,
        token_type: String,
        expires_in: i64,
        refresh_token: Option<String>,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            token_type,
            expires_at: issued_at + chrono::Duration::seconds(expires_in),
            refresh_token,
        }
    }

    /// Whether the credential must no longer be used at instant `now`.
    ///
    /// Expiry is strict: a credential is valid only while `now < expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Authorization state of the application.
///
/// # State Transitions
///
/// ```text
/// SignedOut -> SigningIn -> SignedIn -> SignedOut
///                  |                       ^
///                  +-----------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No usable credential is stored.
    #[default]
    SignedOut,
    /// An authorization redirect round-trip is in progress.
    SigningIn,
    /// A credential is stored and was valid when last checked.
    SignedIn,
}

impl AuthState {
    /// Check if the user holds a credential.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::SigningIn => write!(f, "Signing In..."),
            AuthState::SignedIn => write!(f, "Signed In"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn issued() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_expiry_is_absolute() {
        let cred = Credential::from_token_response(
            "tok".into(),
            "Bearer".into(),
            3600,
            None,
            issued(),
        );
        assert_eq!(cred.expires_at, issued() + Duration::seconds(3600));
    }

    #[test]
    fn test_is_expired_boundaries() {
        let cred = Credential::from_token_response(
            "tok".into(),
            "Bearer".into(),
            3600,
            None,
            issued(),
        );

        assert!(!cred.is_expired(issued()));
        assert!(!cred.is_expired(cred.expires_at - Duration::seconds(1)));
        // Exactly at expiry counts as expired
        assert!(cred.is_expired(cred.expires_at));
        assert!(cred.is_expired(cred.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let cred = Credential::from_token_response(
            "secret_access".into(),
            "Bearer".into(),
            60,
            Some("secret_refresh".into()),
            issued(),
        );
        let debug = format!("{:?}", cred);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret_access"));
        assert!(!debug.contains("secret_refresh"));
    }

    #[test]
    fn test_auth_state() {
        assert!(!AuthState::SignedOut.is_authenticated());
        assert!(!AuthState::SigningIn.is_authenticated());
        assert!(AuthState::SignedIn.is_authenticated());
        assert_eq!(AuthState::default(), AuthState::SignedOut);
    }
}
