//! # Authorization Module
//!
//! Client-side authorization against the streaming vendor using the PKCE
//! variant of the OAuth 2.0 authorization-code flow.
//!
//! ## Overview
//!
//! This crate owns the vendor credential: obtaining it through a redirect
//! round-trip (no client secret, per PKCE for public clients), persisting it
//! under well-known storage keys with an explicit expiry check on load, and
//! clearing it on sign-out or authentication failure.
//!
//! ## Features
//!
//! - PKCE verifier/challenge generation (S256)
//! - Authorization URL construction and callback handling
//! - Credential persistence with strict expiry semantics
//! - Auth state event emission
//!
//! Expired credentials are never silently refreshed; the user re-authorizes.

pub mod credential;
pub mod error;
pub mod manager;
pub mod oauth;
pub mod store;

pub use credential::{AuthState, Credential};
pub use error::{AuthError, Result};
pub use manager::{AuthManager, CallbackParams};
pub use oauth::{OAuthFlow, PkceVerifier};
pub use store::CredentialStore;
