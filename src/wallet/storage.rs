//! Local durable key-value storage
//!
//! A JSON object on disk, one value per key. Writes go through a temp file and
//! a rename so a crash never leaves a half-written store.

use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// File-backed key-value store
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and decode the value under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let entries = self.read_all()?;
        match entries.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| Error::Storage(format!("Failed to decode {}: {}", key, e))),
            None => Ok(None),
        }
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.read_all()?;
        let value = serde_json::to_value(value)?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)?;
        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    fn read_all(&self) -> Result<Map<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Map::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                Error::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write_all(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            Error::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("missing.json"));
        assert_eq!(store.get::<u64>("anything").unwrap(), None);
    }

    #[test]
    fn test_set_replaces_only_its_key() {
        let dir = tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("nested/store.json"));

        store.set("counter", &3u64).unwrap();
        store.set("name", &"sniper").unwrap();
        assert_eq!(store.get::<u64>("counter").unwrap(), Some(3));
        assert_eq!(store.get::<String>("name").unwrap().as_deref(), Some("sniper"));

        store.set("counter", &4u64).unwrap();
        assert_eq!(store.get::<u64>("counter").unwrap(), Some(4));
        assert_eq!(store.get::<String>("name").unwrap().as_deref(), Some("sniper"));
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = LocalStore::open(&path);
        assert!(matches!(store.get::<u64>("k"), Err(Error::Storage(_))));
    }
}
