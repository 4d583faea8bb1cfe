//! HTTP response building module
//!
//! Serializes a resolution outcome into the bytes written to the socket.
//! Every response carries exactly `Content-Type`, `Content-Length`, and
//! `Connection: close`.

use super::mime;
use crate::handler::Resolution;

/// Body sent with every 404
pub const NOT_FOUND_BODY: &str = "File not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotFound => "Not Found",
        }
    }
}

/// A complete response, built once and written once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResponse {
    pub status: Status,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ResolvedResponse {
    pub const fn found(body: Vec<u8>, content_type: &'static str) -> Self {
        Self {
            status: Status::Ok,
            content_type,
            body,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            content_type: mime::DEFAULT_CONTENT_TYPE,
            body: NOT_FOUND_BODY.as_bytes().to_vec(),
        }
    }

    /// Serialize status line, headers, and body
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
            self.content_type,
            self.body.len(),
        );
        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

impl From<Resolution> for ResolvedResponse {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Found { body, content_type } => Self::found(body, content_type),
            Resolution::NotFound => Self::not_found(),
        }
    }
}
