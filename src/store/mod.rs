//! Resource stores consumed by the API.
//!
//! A [`ResourceStore`] is the shared storage configuration: a handle to a
//! [`StorageBackend`] plus the key prefix everything lives under. Each
//! resource kind gets its own typed [`Store`] built from a copy of it.

mod backend;
mod resource_store;

pub use backend::{MemoryBackend, StorageBackend, Versioned};
pub use resource_store::{
    EnvironmentStore, FunctionStore, HttpTriggerStore, ResourceStore, Store, TimeTriggerStore,
    WatchStore,
};
