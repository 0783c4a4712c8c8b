//! Local Store
//!
//! A small string key-value store kept on the local filesystem, one file per
//! key under the data directory. It plays the role of the browser's local
//! storage: writes replace the whole entry, every entry has a size quota,
//! and other processes may change an entry underneath us (which the engine
//! detects through the modification time).
//!
//! ```text
//! data_dir/
//! ├── eventpro_site_content.json
//! └── eventpro_gallery_images.json
//! ```

use crate::content::error::{ContentError, ContentResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Key of the main content entry
pub const CONTENT_KEY: &str = "eventpro_site_content";

/// Key under which old clients stored the flat gallery array
pub const LEGACY_GALLERY_KEY: &str = "eventpro_gallery_images";

/// Default per-entry quota, matching what browsers grant an origin
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// File-backed key-value store
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    quota_bytes: usize,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn quota_bytes(&self) -> usize {
        self.quota_bytes
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> ContentResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ContentError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid store key '{key}'"),
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Read an entry; `None` when it was never written
    pub async fn get(&self, key: &str) -> ContentResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace an entry.
    ///
    /// The value goes to a sibling temp file first and is renamed into
    /// place, so a reader never sees a half-written entry.
    pub async fn set(&self, key: &str, value: &str) -> ContentResult<()> {
        let path = self.path_for(key)?;
        if value.len() > self.quota_bytes {
            return Err(ContentError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                limit: self.quota_bytes,
            });
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Delete an entry; returns whether it existed
    pub async fn remove(&self, key: &str) -> ContentResult<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Last modification time of an entry
    pub async fn modified(&self, key: &str) -> ContentResult<Option<SystemTime>> {
        let path = self.path_for(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(Some(meta.modified()?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Size of an entry in bytes
    pub async fn size(&self, key: &str) -> ContentResult<Option<u64>> {
        let path = self.path_for(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), DEFAULT_QUOTA_BYTES);

        assert_eq!(store.get(CONTENT_KEY).await.unwrap(), None);

        store.set(CONTENT_KEY, r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            store.get(CONTENT_KEY).await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert_eq!(store.size(CONTENT_KEY).await.unwrap(), Some(7));
        assert!(store.modified(CONTENT_KEY).await.unwrap().is_some());

        store.set(CONTENT_KEY, "{}").await.unwrap();
        assert_eq!(store.get(CONTENT_KEY).await.unwrap().as_deref(), Some("{}"));

        assert!(store.remove(CONTENT_KEY).await.unwrap());
        assert!(!store.remove(CONTENT_KEY).await.unwrap());
        assert_eq!(store.get(CONTENT_KEY).await.unwrap(), None);
        assert_eq!(store.size(CONTENT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quota_rejects_large_entries() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path(), 8);

        store.set(CONTENT_KEY, "12345678").await.unwrap();
        let err = store.set(CONTENT_KEY, "123456789").await.unwrap_err();
        assert!(matches!(
            err,
            ContentError::QuotaExceeded { size: 9, limit: 8, .. }
        ));
        // The previous value is untouched
        assert_eq!(
            store.get(CONTENT_KEY).await.unwrap().as_deref(),
            Some("12345678")
        );
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested").join("data"), 1024);
        store.set(LEGACY_GALLERY_KEY, "[]").await.unwrap();
        assert!(dir.path().join("nested/data/eventpro_gallery_images.json").exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = LocalStore::new("/tmp", 1024);
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("").is_err());
        assert!(store.path_for(CONTENT_KEY).is_ok());
    }
}
