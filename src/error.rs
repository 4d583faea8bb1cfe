//! Crate-level error type
//!
//! Only startup failures surface as `Error`. Per-connection problems
//! (missing files, socket resets, timeouts) are contained inside the
//! connection handler and never reach the caller.

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    /// The listening socket could not be established.
    Bind { addr: SocketAddr, source: io::Error },
    /// Configuration could not be loaded or is invalid.
    Config(String),
    /// Bundled assets could not be copied into the asset store.
    Provision { path: PathBuf, source: io::Error },
    /// Log files could not be opened.
    Logger(io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind { addr, source } => {
                write!(f, "Error starting server on {addr}: {source}")
            }
            Self::Config(message) => write!(f, "Invalid configuration: {message}"),
            Self::Provision { path, source } => {
                write!(f, "Failed to provision asset '{}': {source}", path.display())
            }
            Self::Logger(source) => write!(f, "Failed to open log file: {source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bind { source, .. } | Self::Provision { source, .. } | Self::Logger(source) => {
                Some(source)
            }
            Self::Config(_) => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
