//! Path resolution
//!
//! Maps a request path to asset bytes and a content type.

use crate::http::mime;
use crate::logger;
use crate::store::AssetStore;

/// Filename served for `/`
pub const INDEX_FILE: &str = "index.html";

/// Path answered without touching the store
pub const FAVICON_PATH: &str = "/favicon.ico";

/// Outcome of mapping a request path onto the asset store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found {
        body: Vec<u8>,
        content_type: &'static str,
    },
    NotFound,
}

/// Relative filename inside the store for a request path
pub fn target_filename(path: &str) -> &str {
    if path == "/" {
        INDEX_FILE
    } else {
        path.strip_prefix('/').unwrap_or(path)
    }
}

/// Resolve `path` against `store`.
///
/// Any failure to read the target, including a name that would leave the
/// store, becomes [`Resolution::NotFound`].
pub async fn resolve(path: &str, store: &AssetStore) -> Resolution {
    if path == FAVICON_PATH {
        return Resolution::Found {
            body: Vec::new(),
            content_type: mime::FAVICON_CONTENT_TYPE,
        };
    }

    let filename = target_filename(path);
    if store.locate(filename).is_none() {
        logger::log_warning(&format!("Path traversal attempt blocked: {path}"));
        return Resolution::NotFound;
    }

    match store.load(filename).await {
        Ok(asset) => Resolution::Found {
            body: asset.content,
            content_type: asset.content_type,
        },
        Err(e) => {
            logger::log_file_not_found(&store.root().join(filename), &e);
            Resolution::NotFound
        }
    }
}
