//! Access log format module
//!
//! Supports:
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variable` substitution

use chrono::Local;
use serde::Serialize;

/// One answered connection
#[derive(Debug, Clone, Serialize)]
pub struct AccessLogEntry {
    /// Client IP address and port
    pub remote_addr: String,
    /// Time the connection was accepted
    pub time: chrono::DateTime<Local>,
    /// First line of the request as received, lossily decoded
    pub request: String,
    /// Path the parser extracted
    pub path: String,
    /// Response status code
    pub status: u16,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Accept-to-close time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    pub fn new(remote_addr: String, request: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            request,
            path,
            status: 200,
            body_bytes: 0,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request,
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request_time` (seconds, 3 decimals), `$request`, `$path`, `$status`,
    /// `$body_bytes_sent`.
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // $request_time must come before $request
        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace(
                "$time_local",
                &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            )
            .replace("$time_iso8601", &self.time.to_rfc3339())
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request", &self.request)
            .replace("$path", &self.path)
            .replace("$status", &self.status.to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_entry() -> AccessLogEntry {
        let mut entry = AccessLogEntry::new(
            "127.0.0.1:51234".to_string(),
            "GET /index.css HTTP/1.1".to_string(),
            "/index.css".to_string(),
        );
        entry.status = 200;
        entry.body_bytes = 6;
        entry.request_time_us = 1_250_000;
        entry
    }

    #[test]
    fn test_format_common() {
        let log = create_test_entry().format("common");
        assert!(log.starts_with("127.0.0.1:51234 - - ["));
        assert!(log.contains("\"GET /index.css HTTP/1.1\""));
        assert!(log.ends_with("200 6"));
    }

    #[test]
    fn test_format_json() {
        let log = create_test_entry().format("json");
        let value: serde_json::Value = serde_json::from_str(&log).unwrap();
        assert_eq!(value["remote_addr"], "127.0.0.1:51234");
        assert_eq!(value["path"], "/index.css");
        assert_eq!(value["status"], 200);
        assert_eq!(value["body_bytes"], 6);
    }

    #[test]
    fn test_format_custom() {
        let log = create_test_entry().format("$path $status $request_time");
        assert_eq!(log, "/index.css 200 1.250");
    }
}
