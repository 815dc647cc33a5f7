//! The controller API: the five resource stores behind one object, and the
//! handlers the router dispatches to.

mod handlers;
mod respond;

pub use respond::{respond_with_error, respond_with_success, write_response, HOME_BODY};

use crate::logdb::{process_env, EnvLookup, LogDbConfig, LogProxy};
use crate::store::{
    EnvironmentStore, FunctionStore, HttpTriggerStore, ResourceStore, Store, TimeTriggerStore,
    WatchStore,
};

/// One handle per resource kind, all built from the same storage
/// configuration, plus the log proxy.
#[derive(Clone)]
pub struct Api {
    pub functions: FunctionStore,
    pub http_triggers: HttpTriggerStore,
    pub time_triggers: TimeTriggerStore,
    pub environments: EnvironmentStore,
    pub watches: WatchStore,
    log_proxy: LogProxy,
}

impl Api {
    /// Build the API over `store`, reading log database settings from the
    /// process environment.
    pub fn new(store: &ResourceStore) -> Self {
        Self::with_env(store, process_env())
    }

    /// Build the API with an explicit environment lookup.
    pub fn with_env(store: &ResourceStore, env: EnvLookup) -> Self {
        Self {
            functions: Store::new(store.clone()),
            http_triggers: Store::new(store.clone()),
            time_triggers: Store::new(store.clone()),
            environments: Store::new(store.clone()),
            watches: Store::new(store.clone()),
            log_proxy: LogProxy::new(env),
        }
    }

    /// Settings the log proxy would use for `db_type` right now.
    pub fn log_db_config(&self, db_type: &str) -> LogDbConfig {
        self.log_proxy.config(db_type)
    }
}
