//! MIME type detection module
//!
//! Returns the Content-Type for a served filename based on its extension.

use std::path::Path;

/// Type used for any extension not in the table
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Type reported for the synthetic favicon
pub const FAVICON_CONTENT_TYPE: &str = "image/x-icon";

/// Get MIME Content-Type based on file extension
///
/// # Examples
/// ```
/// use loopserve::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("html")), "text/html");
/// assert_eq!(get_content_type(Some("png")), "text/plain");
/// assert_eq!(get_content_type(None), "text/plain");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        Some("html") => "text/html",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Content-Type for a filename relative to the asset store
pub fn content_type_for(filename: &str) -> &'static str {
    get_content_type(Path::new(filename).extension().and_then(|e| e.to_str()))
}
