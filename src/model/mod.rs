//! Resource types served by the controller.
//!
//! Every resource carries a [`Metadata`] block and implements [`Resource`],
//! which is the capability the generic stores and handlers are written
//! against.

mod resources;

pub use resources::{
    Environment, EnvironmentSpec, Function, FunctionReference, FunctionSpec, HttpTrigger,
    HttpTriggerSpec, TimeTrigger, TimeTriggerSpec, Watch, WatchSpec,
};

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identity of a stored resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Opaque version assigned by the store on every write.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_version: String,
}

impl Metadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// The five resource kinds exposed under `/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Function,
    HttpTrigger,
    TimeTrigger,
    Environment,
    Watch,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Function,
        ResourceKind::HttpTrigger,
        ResourceKind::TimeTrigger,
        ResourceKind::Environment,
        ResourceKind::Watch,
    ];

    /// Collection path, e.g. `/v1/triggers/http`.
    pub fn collection_path(&self) -> &'static str {
        match self {
            ResourceKind::Function => "/v1/functions",
            ResourceKind::HttpTrigger => "/v1/triggers/http",
            ResourceKind::TimeTrigger => "/v1/triggers/time",
            ResourceKind::Environment => "/v1/environments",
            ResourceKind::Watch => "/v1/watches",
        }
    }

    /// Name of the path placeholder that carries a single resource's name.
    pub fn placeholder(&self) -> &'static str {
        match self {
            ResourceKind::Function => "function",
            ResourceKind::HttpTrigger => "httpTrigger",
            ResourceKind::TimeTrigger => "timeTrigger",
            ResourceKind::Environment => "environment",
            ResourceKind::Watch => "watch",
        }
    }

    /// Key segment used by the storage backend.
    pub fn storage_key(&self) -> &'static str {
        match self {
            ResourceKind::Function => "functions",
            ResourceKind::HttpTrigger => "triggers/http",
            ResourceKind::TimeTrigger => "triggers/time",
            ResourceKind::Environment => "environments",
            ResourceKind::Watch => "watches",
        }
    }

    /// Human readable singular, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Function => "function",
            ResourceKind::HttpTrigger => "HTTP trigger",
            ResourceKind::TimeTrigger => "time trigger",
            ResourceKind::Environment => "environment",
            ResourceKind::Watch => "watch",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Shared capability of every stored resource.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn metadata(&self) -> &Metadata;

    fn metadata_mut(&mut self) -> &mut Metadata;

    /// Structural checks on the `spec` block. The name is checked separately.
    fn validate_spec(&self) -> Result<(), ApiError> {
        Ok(())
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_name(Self::KIND, &self.metadata().name)?;
        self.validate_spec()
    }
}

/// Names are DNS labels: lowercase alphanumerics and '-', at most 63 chars,
/// starting and ending with an alphanumeric.
pub fn validate_name(kind: ResourceKind, name: &str) -> Result<(), ApiError> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_edges = !name.starts_with('-') && !name.ends_with('-');

    if name.is_empty() || name.len() > 63 || !valid_chars || !valid_edges {
        return Err(ApiError::invalid_argument(format!(
            "invalid {} name '{}': must be a lowercase DNS label of at most 63 characters",
            kind, name
        )));
    }
    Ok(())
}
