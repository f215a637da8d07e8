//! Runtime configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::directory::DirectoryConfig;

/// Default listen address.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Error returned for an unusable environment variable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}: {value:?}")]
pub struct ConfigError {
    var: &'static str,
    value: String,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address to listen on (`STOP_BOARD_ADDR`)
    pub addr: SocketAddr,

    /// Directory for storage slots (`STOP_BOARD_DATA_DIR`)
    pub data_dir: PathBuf,

    /// Directory served under `/static` (`STOP_BOARD_STATIC_DIR`)
    pub static_dir: PathBuf,

    /// Directory API settings (`KMB_BASE_URL`, `KMB_TIMEOUT_SECS`)
    pub directory: DirectoryConfig,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_raw = lookup("STOP_BOARD_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_raw.parse().map_err(|_| ConfigError {
            var: "STOP_BOARD_ADDR",
            value: addr_raw.clone(),
        })?;

        let data_dir = lookup("STOP_BOARD_DATA_DIR").unwrap_or_else(|| "data".to_string());
        let static_dir = lookup("STOP_BOARD_STATIC_DIR").unwrap_or_else(|| "static".to_string());

        let mut directory = DirectoryConfig::new();
        if let Some(url) = lookup("KMB_BASE_URL") {
            directory = directory.with_base_url(url);
        }
        if let Some(raw) = lookup("KMB_TIMEOUT_SECS") {
            let secs = raw.parse().map_err(|_| ConfigError {
                var: "KMB_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            directory = directory.with_timeout(secs);
        }

        Ok(Self {
            addr,
            data_dir: data_dir.into(),
            static_dir: static_dir.into(),
            directory,
        })
    }
}
