//! Connection settings for a log database, read from the environment.

use std::sync::Arc;

/// Default URL when `{DBTYPE}_URL` is unset. Only meaningful for InfluxDB.
pub const INFLUXDB_URL: &str = "http://influxdb:8086";

/// Lookup of an environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|name: &str| std::env::var(name).ok())
}

/// How to reach a log database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDbConfig {
    pub http_url: String,
    /// Empty means no credentials.
    pub username: String,
    pub password: String,
}

impl LogDbConfig {
    /// Resolve the settings for `db_type` from `{DBTYPE}_URL`,
    /// `{DBTYPE}_USERNAME` and `{DBTYPE}_PASSWORD`.
    ///
    /// Never fails: missing variables are empty, and a missing URL falls
    /// back to [`INFLUXDB_URL`] whatever the database type.
    pub fn resolve(db_type: &str, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let prefix = db_type.to_uppercase();
        let read = |suffix: &str| env(&format!("{}_{}", prefix, suffix)).unwrap_or_default();

        let mut http_url = read("URL");
        if http_url.is_empty() {
            http_url = INFLUXDB_URL.to_string();
        }

        Self {
            http_url,
            username: read("USERNAME"),
            password: read("PASSWORD"),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty()
    }
}
