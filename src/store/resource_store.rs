//! Typed CRUD stores over a shared storage backend.

use super::backend::{MemoryBackend, StorageBackend, Versioned};
use crate::error::ApiError;
use crate::model::{Environment, Function, HttpTrigger, Metadata, Resource, TimeTrigger, Watch};
use bytes::Bytes;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Shared storage configuration handed to every resource store.
#[derive(Clone)]
pub struct ResourceStore {
    backend: Arc<dyn StorageBackend>,
    root: String,
}

impl ResourceStore {
    pub fn new(backend: Arc<dyn StorageBackend>, root: impl Into<String>) -> Self {
        let root = root.into().trim_end_matches('/').to_string();
        Self { backend, root }
    }

    /// A store backed by a fresh [`MemoryBackend`].
    pub fn in_memory(root: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), root)
    }

    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        self.backend.clone()
    }

    fn collection_key<R: Resource>(&self) -> String {
        format!("{}/{}/", self.root, R::KIND.storage_key())
    }

    fn key<R: Resource>(&self, name: &str) -> String {
        format!("{}{}", self.collection_key::<R>(), name)
    }
}

/// CRUD operations for one resource kind.
pub struct Store<R: Resource> {
    inner: ResourceStore,
    _kind: PhantomData<fn() -> R>,
}

pub type FunctionStore = Store<Function>;
pub type HttpTriggerStore = Store<HttpTrigger>;
pub type TimeTriggerStore = Store<TimeTrigger>;
pub type EnvironmentStore = Store<Environment>;
pub type WatchStore = Store<Watch>;

impl<R: Resource> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<R: Resource> Store<R> {
    pub fn new(inner: ResourceStore) -> Self {
        Self {
            inner,
            _kind: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<R>, ApiError> {
        let values = self
            .inner
            .backend
            .list(&self.inner.collection_key::<R>())
            .await?;
        values.into_iter().map(decode::<R>).collect()
    }

    pub async fn get(&self, name: &str) -> Result<R, ApiError> {
        let key = self.inner.key::<R>(name);
        match self.inner.backend.get(&key).await? {
            Some(stored) => decode(stored),
            None => Err(not_found::<R>(name)),
        }
    }

    /// Store a new resource and return its assigned metadata.
    pub async fn create(&self, mut resource: R) -> Result<Metadata, ApiError> {
        resource.validate()?;

        let name = resource.metadata().name.clone();
        {
            let meta = resource.metadata_mut();
            meta.uid = Uuid::new_v4().to_string();
            meta.resource_version.clear();
        }

        let key = self.inner.key::<R>(&name);
        let revision = self
            .inner
            .backend
            .create(&key, encode(&resource)?)
            .await
            .map_err(|e| match e {
                ApiError::NameExists(_) => ApiError::NameExists(format!(
                    "{} '{}' already exists",
                    R::KIND,
                    name
                )),
                other => other,
            })?;

        debug!(kind = %R::KIND, name = %name, revision, "created resource");

        let mut meta = resource.metadata().clone();
        meta.resource_version = revision.to_string();
        Ok(meta)
    }

    /// Replace an existing resource.
    ///
    /// A non-empty `resourceVersion` must match the stored one; an empty one
    /// overwrites unconditionally. The uid is immutable.
    pub async fn update(&self, mut resource: R) -> Result<Metadata, ApiError> {
        resource.validate()?;

        let name = resource.metadata().name.clone();
        let expected = parse_version(&resource.metadata().resource_version)?;
        let existing = self.get(&name).await?;

        {
            let meta = resource.metadata_mut();
            meta.uid = existing.metadata().uid.clone();
            meta.resource_version.clear();
        }

        let key = self.inner.key::<R>(&name);
        let revision = self
            .inner
            .backend
            .update(&key, encode(&resource)?, expected)
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => not_found::<R>(&name),
                ApiError::Conflict(_) => ApiError::Conflict(format!(
                    "{} '{}' was modified concurrently; resourceVersion {} is stale",
                    R::KIND,
                    name,
                    resource_version_label(expected)
                )),
                other => other,
            })?;

        debug!(kind = %R::KIND, name = %name, revision, "updated resource");

        let mut meta = resource.metadata().clone();
        meta.resource_version = revision.to_string();
        Ok(meta)
    }

    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        let key = self.inner.key::<R>(name);
        self.inner
            .backend
            .delete(&key)
            .await
            .map_err(|e| match e {
                ApiError::NotFound(_) => not_found::<R>(name),
                other => other,
            })?;

        debug!(kind = %R::KIND, name = %name, "deleted resource");
        Ok(())
    }
}

fn not_found<R: Resource>(name: &str) -> ApiError {
    ApiError::not_found(format!("{} '{}' not found", R::KIND, name))
}

fn parse_version(version: &str) -> Result<Option<u64>, ApiError> {
    if version.is_empty() {
        return Ok(None);
    }
    version.parse::<u64>().map(Some).map_err(|_| {
        ApiError::invalid_argument(format!("invalid resourceVersion '{}'", version))
    })
}

fn resource_version_label(version: Option<u64>) -> String {
    version.map(|v| v.to_string()).unwrap_or_default()
}

fn encode<R: Resource>(resource: &R) -> Result<Bytes, ApiError> {
    serde_json::to_vec(resource)
        .map(Bytes::from)
        .map_err(|e| ApiError::internal(format!("failed to encode {}: {}", R::KIND, e)))
}

fn decode<R: Resource>(stored: Versioned) -> Result<R, ApiError> {
    let mut resource: R = serde_json::from_slice(&stored.value)
        .map_err(|e| ApiError::internal(format!("corrupt {} record: {}", R::KIND, e)))?;
    resource.metadata_mut().resource_version = stored.revision.to_string();
    Ok(resource)
}
