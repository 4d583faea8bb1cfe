// Configuration module entry point
// Loads layered configuration: file, environment, then built-in defaults

mod types;

use std::net::SocketAddr;

use crate::error::{Error, Result};

pub use types::{AssetsConfig, Config, LoggingConfig, ServerConfig};

/// Default config file name (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_PATH: &str = "loopserve";

/// Environment variable prefix, e.g. `LOOPSERVE__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "LOOPSERVE";

impl Config {
    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.read_timeout_ms", 5000)?
            .set_default("server.write_timeout_ms", 5000)?
            .set_default("server.shutdown_grace_ms", 1000)?
            .set_default("assets.dist_dir", "dist")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.socket_addr()?;
        Ok(cfg)
    }

    /// Load from `DEFAULT_CONFIG_PATH`
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {e}")))
    }
}
