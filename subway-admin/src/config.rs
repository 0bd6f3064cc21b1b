//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable holding the listen address.
pub const BIND_ADDR_VAR: &str = "SUBWAY_BIND_ADDR";

/// Environment variable holding the snapshot file path.
pub const SNAPSHOT_PATH_VAR: &str = "SUBWAY_SNAPSHOT_PATH";

/// Error returned when a configuration value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}: {reason}")]
pub struct ConfigError {
    var: &'static str,
    reason: String,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Snapshot file for persistence. `None` keeps records in memory only.
    pub snapshot_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr.trim().parse().map_err(|e| ConfigError {
                var: BIND_ADDR_VAR,
                reason: format!("{e}: {addr:?}"),
            })?;
        }

        if let Some(path) = lookup(SNAPSHOT_PATH_VAR) {
            let path = path.trim();
            if path.is_empty() {
                return Err(ConfigError {
                    var: SNAPSHOT_PATH_VAR,
                    reason: "must not be empty".to_string(),
                });
            }
            config.snapshot_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            snapshot_path: None,
        }
    }
}
