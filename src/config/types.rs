// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
}

/// Listener and per-connection settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Inactivity timeout armed on accept, in milliseconds
    pub read_timeout_ms: u64,
    /// Upper bound on writing one response, in milliseconds
    pub write_timeout_ms: u64,
    /// How long shutdown waits for in-flight connections, in milliseconds
    pub shutdown_grace_ms: u64,
}

impl ServerConfig {
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub const fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Asset store location and provisioning source
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Flat directory the server reads from
    pub dist_dir: PathBuf,
    /// Bundled resources copied into `dist_dir` on first start
    #[serde(default)]
    pub bundle_dir: Option<PathBuf>,
    /// Logical filenames copied from `bundle_dir`
    #[serde(default = "default_asset_files")]
    pub files: Vec<String>,
}

fn default_asset_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.css".to_string()]
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}
