//! Logger module
//!
//! Provides logging utilities for the asset server including:
//! - Server lifecycle logging
//! - Per-connection access logging in several formats
//! - Leveled error, warning, and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::LoggingConfig;
use chrono::Local;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log severity, ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    /// Unknown names fall back to `Info`
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }

    const fn tag(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Error,
            1 => Self::Warn,
            3 => Self::Debug,
            _ => Self::Info,
        }
    }
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    set_level(Level::parse(&config.level));
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

pub fn set_level(level: Level) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn enabled(level: Level) -> bool {
    level <= Level::from_u8(MAX_LEVEL.load(Ordering::Relaxed))
}

fn write(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    let line = format!(
        "{} [{}] {message}",
        Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        level.tag()
    );
    let to_error_target = level <= Level::Warn;
    match writer::get() {
        Some(w) if to_error_target => w.write_error(&line),
        Some(w) => w.write_info(&line),
        None if to_error_target => eprintln!("{line}"),
        None => println!("{line}"),
    }
}

pub fn log_info(message: &str) {
    write(Level::Info, message);
}

pub fn log_debug(message: &str) {
    write(Level::Debug, message);
}

pub fn log_warning(message: &str) {
    write(Level::Warn, message);
}

pub fn log_error(message: &str) {
    write(Level::Error, message);
}

pub fn log_server_start(url: &str, dist_dir: &std::path::Path) {
    log_info("======================================");
    log_info("Asset server started successfully");
    log_info(&format!("Listening on: {url}"));
    log_info(&format!("Serving from: {}", dist_dir.display()));
    log_info("======================================");
}

pub fn log_bind_failed(addr: &SocketAddr, err: &std::io::Error) {
    log_error(&format!("✗ Failed to bind {addr}: {err}"));
}

pub fn log_accept_failed(err: &std::io::Error) {
    log_error(&format!("Failed to accept connection: {err}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_timeout(peer_addr: &SocketAddr, secs: f64) {
    log_warning(&format!(
        "[Connection] {peer_addr} sent nothing within {secs:.1}s, closing"
    ));
}

pub fn log_transport_error(peer_addr: &SocketAddr, state: &str, err: &impl std::fmt::Display) {
    log_error(&format!("[Connection] {peer_addr} failed while {state}: {err}"));
}

pub fn log_file_not_found(target: &std::path::Path, err: &std::io::Error) {
    log_warning(&format!("File not found: {} ({err})", target.display()));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_info(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown(addr: &SocketAddr, in_flight: usize) {
    log_info(&format!(
        "Listener on {addr} closed, {in_flight} connection(s) still in flight"
    ));
}
