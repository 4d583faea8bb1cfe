//! HTTP protocol layer module
//!
//! The minimum of HTTP this server speaks: pull a target out of a request
//! line, pick a content type, and serialize a single response.

pub mod mime;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::IncomingRequest;
pub use response::{ResolvedResponse, Status};
