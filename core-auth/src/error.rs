use thiserror::Error;

use bridge_traits::error::BridgeError;

/// Authorization failures.
///
/// Every variant's `Display` text is user-facing status copy; all failures
/// are terminal for the current flow attempt and require restarting
/// authorization.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication failed: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("No authorization code received from the streaming service")]
    MissingCode,

    #[error("Code verifier not found. Please try connecting again")]
    MissingVerifier,

    #[error("Token exchange failed ({status}): {message}")]
    TokenEndpoint { status: u16, message: String },

    #[error("Not connected to the streaming service")]
    NotAuthenticated,

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
