//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and platform-specific
//! implementations. Each trait represents a capability that the core requires but
//! that must be implemented differently per platform (desktop, web, mobile).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations against the vendor's web API
//!
//! ### Storage
//! - [`KeyValueStore`](storage::KeyValueStore) - Durable client-side key-value persistence
//!
//! ### Playback
//! - [`PlayerBridge`](player::PlayerBridge) - The vendor real-time playback SDK,
//!   injected instead of registered through the SDK's global ready-callback
//! - [`TokenSupplier`](player::TokenSupplier) - OAuth token callback handed to the SDK
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic expiry testing
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert platform-specific errors to `BridgeError` and
//! provide actionable messages.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent usage
//! across async tasks.

pub mod error;
pub mod http;
pub mod player;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use player::{
    BridgeTrack, PlayerBridge, PlayerEvent, PlayerEventReceiver, PlayerOptions,
    PlayerStateSnapshot, TokenSupplier,
};
pub use storage::KeyValueStore;
pub use time::{Clock, SystemClock};
