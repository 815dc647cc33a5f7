//! # Fission controller
//!
//! REST control surface for Fission: CRUD over functions, HTTP triggers,
//! time triggers, environments and watches, plus a proxy that forwards
//! function log queries to a time-series log database.
//!
//! ## Architecture
//!
//! ```text
//!   request ──▶ access log ──▶ RouteTable ──▶ Api ──▶ Store<R> ──▶ StorageBackend
//!                                  │            │
//!                                  │            └──▶ LogProxy ──▶ log database
//!                                  └── no match: 404 page not found
//! ```
//!
//! Handlers finish with either `respond_with_success` (JSON) or
//! `respond_with_error`, which maps an [`ApiError`] onto a status code and a
//! plain text message.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fission_controller::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ControllerConfig::new().port(8888);
//!     let api = Api::new(&ResourceStore::in_memory(config.storage_root.clone()));
//!
//!     ControllerServer::new(config, api).serve().await?;
//!     Ok(())
//! }
//! ```

pub mod access_log;
pub mod api;
pub mod error;
pub mod http;
pub mod logdb;
pub mod model;
pub mod router;
pub mod runtime;
pub mod store;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::api::Api;
    pub use crate::error::{translate, ApiError};
    pub use crate::http::{ApiRequest, ApiResponse, Method};
    pub use crate::logdb::LogDbConfig;
    pub use crate::model::{
        Environment, Function, HttpTrigger, Metadata, Resource, ResourceKind, TimeTrigger, Watch,
    };
    pub use crate::router::RouteTable;
    pub use crate::runtime::{ControllerConfig, ControllerServer, ServeError};
    pub use crate::store::ResourceStore;
}

// Re-export for convenience
pub use api::Api;
pub use error::ApiError;
pub use runtime::{ControllerConfig, ControllerServer};
