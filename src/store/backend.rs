//! Key/value storage behind the resource stores.

use crate::error::ApiError;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// A stored value together with the revision of its last write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: Bytes,
    pub revision: u64,
}

/// Trait for storage backends.
///
/// Revisions increase monotonically across the whole backend, so a
/// revision identifies one particular write of one particular key.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Versioned>, ApiError>;

    /// Store a new key. Fails with `NameExists` if the key is taken.
    async fn create(&self, key: &str, value: Bytes) -> Result<u64, ApiError>;

    /// Overwrite an existing key, optionally only if its revision matches.
    async fn update(
        &self,
        key: &str,
        value: Bytes,
        expected_revision: Option<u64>,
    ) -> Result<u64, ApiError>;

    /// Remove a key. Fails with `NotFound` if it does not exist.
    async fn delete(&self, key: &str) -> Result<(), ApiError>;

    /// All values whose key starts with `prefix`, in key order.
    async fn list(&self, prefix: &str) -> Result<Vec<Versioned>, ApiError>;
}

#[derive(Default)]
struct MemoryState {
    entries: BTreeMap<String, Versioned>,
    revision: u64,
}

impl MemoryState {
    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

/// In-memory implementation of StorageBackend.
///
/// Useful for development and testing, or for single-node deployments.
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, ApiError> {
        let state = self.state.read().await;
        Ok(state.entries.get(key).cloned())
    }

    async fn create(&self, key: &str, value: Bytes) -> Result<u64, ApiError> {
        let mut state = self.state.write().await;

        if state.entries.contains_key(key) {
            return Err(ApiError::NameExists(format!("key '{}' already exists", key)));
        }

        let revision = state.next_revision();
        state
            .entries
            .insert(key.to_string(), Versioned { value, revision });
        Ok(revision)
    }

    async fn update(
        &self,
        key: &str,
        value: Bytes,
        expected_revision: Option<u64>,
    ) -> Result<u64, ApiError> {
        let mut state = self.state.write().await;

        let current = state
            .entries
            .get(key)
            .map(|v| v.revision)
            .ok_or_else(|| ApiError::not_found(format!("key '{}' not found", key)))?;

        if let Some(expected) = expected_revision {
            if expected != current {
                return Err(ApiError::Conflict(format!(
                    "key '{}' is at revision {}, not {}",
                    key, current, expected
                )));
            }
        }

        let revision = state.next_revision();
        state
            .entries
            .insert(key.to_string(), Versioned { value, revision });
        Ok(revision)
    }

    async fn delete(&self, key: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state
            .entries
            .remove(key)
            .ok_or_else(|| ApiError::not_found(format!("key '{}' not found", key)))?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<Versioned>, ApiError> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_create_and_get() {
        let backend = MemoryBackend::new();

        let rev = backend.create("/a/x", Bytes::from("1")).await.unwrap();
        let stored = backend.get("/a/x").await.unwrap().unwrap();

        assert_eq!(stored.revision, rev);
        assert_eq!(stored.value, Bytes::from("1"));
        assert!(backend.get("/a/y").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_backend_duplicate_create() {
        let backend = MemoryBackend::new();

        backend.create("/a/x", Bytes::from("1")).await.unwrap();
        let result = backend.create("/a/x", Bytes::from("2")).await;

        assert!(matches!(result, Err(ApiError::NameExists(_))));
    }

    #[tokio::test]
    async fn test_memory_backend_update_checks_revision() {
        let backend = MemoryBackend::new();

        let rev = backend.create("/a/x", Bytes::from("1")).await.unwrap();
        let next = backend
            .update("/a/x", Bytes::from("2"), Some(rev))
            .await
            .unwrap();
        assert!(next > rev);

        let stale = backend.update("/a/x", Bytes::from("3"), Some(rev)).await;
        assert!(matches!(stale, Err(ApiError::Conflict(_))));

        let missing = backend.update("/a/y", Bytes::from("3"), None).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_backend_remove() {
        let backend = MemoryBackend::new();

        backend.create("/a/x", Bytes::from("1")).await.unwrap();
        backend.delete("/a/x").await.unwrap();

        assert!(backend.get("/a/x").await.unwrap().is_none());
        assert!(matches!(
            backend.delete("/a/x").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_backend_list_by_prefix() {
        let backend = MemoryBackend::new();

        backend.create("/t/http/a", Bytes::from("a")).await.unwrap();
        backend.create("/t/http/b", Bytes::from("b")).await.unwrap();
        backend.create("/t/time/c", Bytes::from("c")).await.unwrap();

        let values = backend.list("/t/http/").await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, Bytes::from("a"));
    }
}
