//! Loopback file server for bundled static assets.
//!
//! Each accepted connection gets exactly one response: the first chunk read
//! is parsed for a `GET <path>` target, the path is mapped onto a flat asset
//! directory, and a `200`/`404` with `Connection: close` is written before
//! the socket is shut down.
//!
//! ```no_run
//! # async fn run() -> loopserve::Result<()> {
//! use loopserve::{server, AssetStore};
//!
//! let store = AssetStore::new("dist");
//! let settings = server::ServerSettings::new("127.0.0.1:8080".parse().unwrap());
//! let handle = server::start(settings, store)?;
//! println!("point the renderer at {}", handle.url());
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod store;

pub use error::{Error, Result};
pub use store::{AssetStore, ServedAsset};
