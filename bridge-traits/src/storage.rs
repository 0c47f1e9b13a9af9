//! Durable Key-Value Storage Abstraction
//!
//! The core persists a small set of string values (credential fields, the
//! transient PKCE verifier) under well-known keys. Hosts back this trait with
//! whatever durable client-side storage they have: a JSON file on desktop,
//! `localStorage` on the web, preference stores on mobile.

use async_trait::async_trait;

use crate::error::Result;

/// Durable string key-value store.
///
/// Semantics intentionally match browser `localStorage`: string keys, string
/// values, last writer wins. Concurrent writers sharing the same backing
/// store (e.g., two browser tabs) are out of scope for the core.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::KeyValueStore;
///
/// async fn remember(store: &dyn KeyValueStore) -> Result<()> {
///     store.set("streaming_token_type", "Bearer").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous value for the key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Check whether a key exists without retrieving it.
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Retrieve and delete a value in one step.
    ///
    /// Used for single-use secrets such as the PKCE code verifier, which must
    /// be consumed exactly once.
    async fn take(&self, key: &str) -> Result<Option<String>> {
        let value = self.get(key).await?;
        if value.is_some() {
            self.remove(key).await?;
        }
        Ok(value)
    }

    /// Delete all keys.
    async fn clear_all(&self) -> Result<()>;
}
