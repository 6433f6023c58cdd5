//! Server configuration.
//!
//! Every field has a default and may be overridden from the environment:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `SESSION_BIND_ADDR` | `bind_addr` | `0.0.0.0:3000` |
//! | `SESSION_STORAGE_FILE` | `storage_file` | unset (memory only) |
//! | `SESSION_NAMESPACE` | `namespace` | `userSession` |
//!
//! An empty `SESSION_NAMESPACE` makes the server manage the whole stored
//! document instead of one key of it.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use session_core::DEFAULT_NAMESPACE;
use thiserror::Error;

pub const ENV_BIND_ADDR: &str = "SESSION_BIND_ADDR";
pub const ENV_STORAGE_FILE: &str = "SESSION_STORAGE_FILE";
pub const ENV_NAMESPACE: &str = "SESSION_NAMESPACE";

/// Errors that can occur while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

/// Configuration for the session server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server name reported by the health endpoint.
    pub name: String,
    /// Server version reported by the health endpoint.
    pub version: String,
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// JSON file the session document is persisted to.
    pub storage_file: Option<PathBuf>,
    /// Key of the managed sub-tree; empty for the whole document.
    pub namespace: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "session-server-rust".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            storage_file: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = value
                .parse()
                .map_err(|source| ConfigError::InvalidBindAddr { value, source })?;
        }

        if let Some(value) = lookup(ENV_STORAGE_FILE).filter(|v| !v.is_empty()) {
            config.storage_file = Some(PathBuf::from(value));
        }

        if let Some(value) = lookup(ENV_NAMESPACE) {
            config.namespace = value;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.storage_file, None);
        assert_eq!(config.namespace, "userSession");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            (ENV_BIND_ADDR, "127.0.0.1:8080"),
            (ENV_STORAGE_FILE, "/tmp/session.json"),
            (ENV_NAMESPACE, ""),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.storage_file, Some(PathBuf::from("/tmp/session.json")));
        assert!(config.namespace.is_empty());
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = ServerConfig::from_lookup(lookup_from(&[(ENV_BIND_ADDR, "not-an-addr")]))
            .unwrap_err();
        assert!(err.to_string().contains("not-an-addr"));
    }
}
