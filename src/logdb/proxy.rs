//! Forwarding of function log queries to a log database.

use super::config::{EnvLookup, LogDbConfig};
use crate::error::ApiError;
use bytes::Bytes;
use tracing::debug;

/// Log databases the proxy knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDatabase {
    InfluxDb,
}

impl LogDatabase {
    pub fn from_name(db_type: &str) -> Option<Self> {
        match db_type.to_lowercase().as_str() {
            "influxdb" => Some(LogDatabase::InfluxDb),
            _ => None,
        }
    }
}

/// Forwards a query body to the configured log database.
#[derive(Clone)]
pub struct LogProxy {
    client: reqwest::Client,
    env: EnvLookup,
}

impl LogProxy {
    pub fn new(env: EnvLookup) -> Self {
        Self {
            client: reqwest::Client::new(),
            env,
        }
    }

    /// Settings for `db_type`, resolved fresh on every call.
    pub fn config(&self, db_type: &str) -> LogDbConfig {
        LogDbConfig::resolve(db_type, &*self.env)
    }

    /// Forward a query and return the database's response body.
    pub async fn forward(
        &self,
        db_type: &str,
        query: Option<&str>,
        content_type: Option<&str>,
        body: Bytes,
    ) -> Result<Bytes, ApiError> {
        let database = LogDatabase::from_name(db_type).ok_or_else(|| {
            ApiError::invalid_argument(format!("unsupported log database type '{}'", db_type))
        })?;
        let config = self.config(db_type);

        match database {
            LogDatabase::InfluxDb => self.influxdb_query(&config, query, content_type, body).await,
        }
    }

    async fn influxdb_query(
        &self,
        config: &LogDbConfig,
        query: Option<&str>,
        content_type: Option<&str>,
        body: Bytes,
    ) -> Result<Bytes, ApiError> {
        let mut url = format!("{}/query", config.http_url.trim_end_matches('/'));
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(q);
        }

        debug!(url = %url, "forwarding log query to influxdb");

        let mut request = self.client.post(&url).body(body);
        if let Some(ct) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, ct);
        }
        if config.has_credentials() {
            request = request.query(&[
                ("u", config.username.as_str()),
                ("p", config.password.as_str()),
            ]);
        }

        let response = request.send().await?;
        let status = response.status();
        let payload = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::LogBackend(format!(
                "log database returned {}: {}",
                status,
                String::from_utf8_lossy(&payload).trim()
            )));
        }
        Ok(payload)
    }
}
