//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the controller server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
    /// Key prefix every resource is stored under.
    pub storage_root: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            max_body_size: 10 * 1024 * 1024, // 10MB
            storage_root: "/fission".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn storage_root(mut self, root: impl Into<String>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::new();
        assert_eq!(config.bind_addr(), "0.0.0.0:8888");
        assert_eq!(config.storage_root, "/fission");
    }

    #[test]
    fn test_builder() {
        let config = ControllerConfig::new()
            .host("127.0.0.1")
            .port(0)
            .max_body_size(16);
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
        assert_eq!(config.max_body_size, 16);
    }
}
