//! Asset store module
//!
//! A flat directory of pre-bundled files. It is populated once before the
//! server starts and only read afterwards, so clones can be shared freely
//! across connection tasks.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::error::{Error, Result};
use crate::http::mime;
use crate::logger;

/// One file held by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedAsset {
    pub name: String,
    pub content: Vec<u8>,
    pub content_type: &'static str,
}

/// Read-only handle to the asset directory
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: Arc<PathBuf>,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `name` inside the store, or `None` if `name` would escape it
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let contained = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        contained.then(|| self.root.join(relative))
    }

    /// Read `name` from the store
    pub async fn load(&self, name: &str) -> io::Result<ServedAsset> {
        let path = self.locate(name).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("'{name}' is outside the asset store"),
            )
        })?;
        let content = fs::read(&path).await?;
        Ok(ServedAsset {
            name: name.to_string(),
            content,
            content_type: mime::content_type_for(name),
        })
    }

    /// Populate the store from a bundle directory.
    ///
    /// Only runs when the store directory does not exist yet; an existing
    /// directory is left untouched. Returns the number of files copied.
    pub async fn provision(&self, bundle_dir: &Path, files: &[String]) -> Result<usize> {
        let exists = fs::try_exists(self.root.as_path())
            .await
            .map_err(|source| Error::Provision {
                path: self.root.to_path_buf(),
                source,
            })?;
        if exists {
            logger::log_debug(&format!(
                "Asset store {} already exists, skipping provisioning",
                self.root.display()
            ));
            return Ok(0);
        }

        fs::create_dir_all(self.root.as_path())
            .await
            .map_err(|source| Error::Provision {
                path: self.root.to_path_buf(),
                source,
            })?;
        logger::log_info(&format!("Created asset store at {}", self.root.display()));

        let mut copied = 0;
        for file in files {
            let target = self.locate(file).ok_or_else(|| Error::Provision {
                path: PathBuf::from(file),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a plain filename"),
            })?;
            let source_path = bundle_dir.join(file);
            fs::copy(&source_path, &target)
                .await
                .map_err(|source| Error::Provision {
                    path: source_path.clone(),
                    source,
                })?;
            logger::log_debug(&format!("Copied {} to {}", source_path.display(), target.display()));
            copied += 1;
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_infers_content_type() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.css"), "body{}").unwrap();

        let store = AssetStore::new(dir.path());
        let asset = store.load("index.css").await.unwrap();
        assert_eq!(asset.name, "index.css");
        assert_eq!(asset.content, b"body{}");
        assert_eq!(asset.content_type, "text/css");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        let err = store.load("nope.txt").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_locate_rejects_escaping_names() {
        let store = AssetStore::new("/srv/dist");
        assert_eq!(
            store.locate("index.html"),
            Some(PathBuf::from("/srv/dist/index.html"))
        );
        assert!(store.locate("../secret.txt").is_none());
        assert!(store.locate("css/../../secret.txt").is_none());
        assert!(store.locate("/etc/passwd").is_none());
        assert!(store.locate("").is_none());
    }

    #[tokio::test]
    async fn test_provision_copies_only_into_new_directory() {
        let bundle = tempfile::tempdir().unwrap();
        std::fs::write(bundle.path().join("index.html"), "<h1>hi</h1>").unwrap();
        std::fs::write(bundle.path().join("index.css"), "body{}").unwrap();

        let target = tempfile::tempdir().unwrap();
        let store = AssetStore::new(target.path().join("dist"));
        let files = vec!["index.html".to_string(), "index.css".to_string()];

        assert_eq!(store.provision(bundle.path(), &files).await.unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(store.root().join("index.html")).unwrap(),
            "<h1>hi</h1>"
        );

        // Second run leaves the populated store alone
        std::fs::write(bundle.path().join("index.html"), "changed").unwrap();
        assert_eq!(store.provision(bundle.path(), &files).await.unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(store.root().join("index.html")).unwrap(),
            "<h1>hi</h1>"
        );
    }

    #[tokio::test]
    async fn test_provision_unreadable_root_fails_without_copying() {
        let bundle = tempfile::tempdir().unwrap();
        std::fs::write(bundle.path().join("index.html"), "<h1>hi</h1>").unwrap();

        // A regular file where a directory is expected makes the stat fail
        let target = tempfile::tempdir().unwrap();
        let blocker = target.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = AssetStore::new(blocker.join("dist"));

        let err = store
            .provision(bundle.path(), &["index.html".to_string()])
            .await
            .unwrap_err();
        match err {
            Error::Provision { path, .. } => assert_eq!(path, blocker.join("dist")),
            other => panic!("expected provision error, got {other:?}"),
        }
        assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[tokio::test]
    async fn test_provision_missing_bundle_file_fails() {
        let bundle = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let store = AssetStore::new(target.path().join("dist"));

        let err = store
            .provision(bundle.path(), &["index.html".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provision { .. }));
    }
}
