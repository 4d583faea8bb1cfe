//! Request line parsing
//!
//! Only the request target is extracted. Headers, method, and version are
//! never interpreted; anything that does not look like `GET <path> HTTP`
//! falls back to the index page.

/// Path served when the request target cannot be found
pub const DEFAULT_PATH: &str = "/index.html";

const METHOD_MARKER: &str = "GET ";
const VERSION_MARKER: &str = " HTTP";

/// One request as received on a connection
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    raw: Vec<u8>,
    path: String,
}

impl IncomingRequest {
    pub fn parse(raw: Vec<u8>) -> Self {
        let path = extract_path(&String::from_utf8_lossy(&raw)).to_string();
        Self { raw, path }
    }

    /// Always begins with `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// First line of the raw request, for logging
    pub fn request_line(&self) -> String {
        let text = String::from_utf8_lossy(&self.raw);
        text.lines().next().unwrap_or_default().trim_end().to_string()
    }
}

/// Extract the target between `GET ` and ` HTTP` on a single line.
///
/// The target must be non-empty and start with `/`; otherwise
/// [`DEFAULT_PATH`] is returned. Query strings and percent-escapes are left
/// untouched.
pub fn extract_path(request: &str) -> &str {
    let mut search_from = 0;
    while let Some(offset) = request[search_from..].find(METHOD_MARKER) {
        let start = search_from + offset + METHOD_MARKER.len();
        let line = request[start..]
            .split(['\r', '\n'])
            .next()
            .unwrap_or_default();

        // The target is at least one character long
        let end = line
            .char_indices()
            .nth(1)
            .and_then(|(first, _)| line[first..].find(VERSION_MARKER).map(|pos| first + pos));
        if let Some(end) = end {
            let target = &line[..end];
            return if target.starts_with('/') {
                target
            } else {
                DEFAULT_PATH
            };
        }
        search_from = start;
    }
    DEFAULT_PATH
}
