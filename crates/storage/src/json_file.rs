//! File storage implementation.
//!
//! Stores each key as `<key>.json` under a root directory. Values are written
//! verbatim; the extension only reflects what the engine stores. Writes go
//! through a temporary file and a rename so a crash never leaves a
//! half-written value.

use super::{KeyValueStore, Result, StorageError};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// File-based key-value backend.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create storage rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Directory values are stored in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;

        debug!("Wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.key_path(key)?;
        fs::remove_file(&path).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data")).await.unwrap();

        assert_eq!(store.get_item("progress").await.unwrap(), None);

        store.set_item("progress", r#"{"version":1}"#).await.unwrap();
        assert_eq!(
            store.get_item("progress").await.unwrap().as_deref(),
            Some(r#"{"version":1}"#)
        );
        assert!(dir.path().join("data").join("progress.json").exists());
        assert!(!dir.path().join("data").join("progress.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.remove_item("nothing").await.unwrap();
        store.set_item("k", "[]").await.unwrap();
        store.remove_item("k").await.unwrap();
        assert_eq!(store.get_item("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_invalid_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        assert!(matches!(
            store.set_item("../escape", "{}").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.get_item("").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.remove_item(".hidden").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_values_are_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path()).await.unwrap();

        store.set_item("note", "not json").await.unwrap();
        assert_eq!(store.get_item("note").await.unwrap().as_deref(), Some("not json"));

        store.set_item("empty", "").await.unwrap();
        assert_eq!(store.get_item("empty").await.unwrap().as_deref(), Some(""));
    }
}
