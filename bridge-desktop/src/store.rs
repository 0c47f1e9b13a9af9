//! Key-Value Storage Implementations
//!
//! `JsonFileStore` persists the store as a single JSON object on disk,
//! standing in for the browser's `localStorage` on desktop hosts.
//! `MemoryStore` backs tests and ephemeral sessions.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::KeyValueStore,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// JSON-file-backed key-value store.
///
/// The whole map is rewritten on every mutation; the store holds a handful
/// of short credential strings, so durability wins over write efficiency.
pub struct JsonFileStore {
    path: PathBuf,
    map: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open or create a store at the given path.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let map = match tokio::fs::read(&path).await {
            Ok(contents) => serde_json::from_slice(&contents).map_err(|e| {
                BridgeError::OperationFailed(format!(
                    "Corrupt store file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        debug!(path = %path.display(), "Opened key-value store");

        Ok(Self {
            path,
            map: Mutex::new(map),
        })
    }

    fn snapshot(&self) -> HashMap<String, String> {
        self.map.lock().expect("store mutex poisoned").clone()
    }

    async fn persist(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.snapshot())
            .map_err(|e| BridgeError::OperationFailed(format!("Serialize store: {}", e)))?;
        write_atomically(&self.path, &json).await
    }
}

/// Write via a sibling temp file and rename, so a crash mid-write cannot
/// truncate the store.
async fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(BridgeError::Io)?;
    tokio::fs::rename(&tmp, path).await.map_err(BridgeError::Io)
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().expect("store mutex poisoned").get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        self.persist().await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.map.lock().expect("store mutex poisoned").remove(key);
        self.persist().await
    }

    async fn clear_all(&self) -> Result<()> {
        self.map.lock().expect("store mutex poisoned").clear();
        self.persist().await
    }
}

/// In-memory key-value store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.map.lock().expect("store mutex poisoned").get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.map.lock().expect("store mutex poisoned").remove(key);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.map.lock().expect("store mutex poisoned").clear();
        Ok(())
    }
}
