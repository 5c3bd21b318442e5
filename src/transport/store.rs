//! # Durable store for the tenant→destination mapping.
//!
//! The mapping is serialized as a flat JSON object:
//! ```json
//! {"guild-1":"channel-9","guild-2":"channel-4"}
//! ```
//!
//! ## Rules
//! - A missing file is reported as [`StoreError::Missing`], never created on load.
//! - `save` writes a sibling temporary file and renames it over the target,
//!   so a crash mid-write never leaves a truncated record behind.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StoreError;

/// Durable key-value-set abstraction holding the directory mapping.
#[async_trait]
pub trait DirectoryStore: Send + Sync + 'static {
    /// Reads the whole mapping.
    async fn load(&self) -> Result<HashMap<String, String>, StoreError>;

    /// Replaces the whole mapping.
    async fn save(&self, map: &HashMap<String, String>) -> Result<(), StoreError>;
}

/// [`DirectoryStore`] backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for `path`; nothing is touched until `load`/`save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl DirectoryStore for JsonFileStore {
    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(map).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("channels.json"));

        let mut map = HashMap::new();
        map.insert("g1".to_string(), "c1".to_string());
        map.insert("g2".to_string(), "c2".to_string());
        store.save(&map).await.unwrap();

        assert_eq!(store.load().await.unwrap(), map);
    }

    #[tokio::test]
    async fn test_flat_object_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("channels.json"));

        let mut map = HashMap::new();
        map.insert("g1".to_string(), "c1".to_string());
        store.save(&map).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"g1":"c1"}"#);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        let err = store.load().await.unwrap_err();
        assert_eq!(err.as_label(), "store_missing");
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("channels.json");
        std::fs::write(&path, b"[1, 2, 3]").unwrap();

        let err = JsonFileStore::new(path).load().await.unwrap_err();
        assert_eq!(err.as_label(), "store_malformed");
    }

    #[tokio::test]
    async fn test_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("no-such-dir").join("channels.json"));

        let err = store.save(&HashMap::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "store_io");
    }
}
