//! Backing key-value storage for the local store.
//!
//! The store only ever needs string blobs under a handful of fixed keys, the
//! same contract as browser `localStorage`. Backends are swapped at startup
//! via `STORAGE_BACKEND`; tests use `MemoryStorage`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

mod file;
mod redis_kv;

pub use file::FileStorage;
pub use redis_kv::RedisStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// String-keyed blob storage. Values are opaque to the backend.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage. Contents are lost on drop.
#[derive(Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "[1,2]").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("[1,2]"));

        storage.set("k", "[]").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("[]"));

        storage.remove("k").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_storage_remove_missing_is_ok() {
        let storage = MemoryStorage::new();
        assert!(storage.remove("nope").await.is_ok());
    }

    #[tokio::test]
    async fn test_memory_storage_clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set("shared", "1").await.unwrap();
        assert_eq!(other.get("shared").await.unwrap().as_deref(), Some("1"));
    }
}
