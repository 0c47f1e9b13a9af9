//! # Desktop Bridge Implementations
//!
//! Concrete adapters for the [`bridge-traits`](bridge_traits) capabilities
//! on desktop hosts:
//!
//! - [`ReqwestHttpClient`](http::ReqwestHttpClient) - HTTP via reqwest with
//!   transient-failure retries
//! - [`JsonFileStore`](store::JsonFileStore) - durable key-value storage as
//!   a JSON file (the desktop analog of the web client's `localStorage`)
//! - [`MemoryStore`](store::MemoryStore) - ephemeral store for tests
//!
//! No [`PlayerBridge`](bridge_traits::player::PlayerBridge) ships here: the
//! vendor's real-time SDK is a platform script the embedding host must wrap.

pub mod http;
pub mod store;

pub use http::ReqwestHttpClient;
pub use store::{JsonFileStore, MemoryStore};
