use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::domain::{common::entities::app_errors::StoreError, quota::ports::KeyValueStore};

/// One JSON file per key under a per-device data directory.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {}", root.display(), e))
        })?;

        debug!(root = %root.display(), "Opened file key/value store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        self.root.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value)
            .and_then(|_| fs::rename(&staging, &path))
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("labelscan-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_missing_key_reads_as_none() {
        let dir = scratch_dir();
        let store = FileKeyValueStore::new(&dir).unwrap();
        assert_eq!(store.get("absent").unwrap(), None);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_set_then_get_overwrites() {
        let dir = scratch_dir();
        let store = FileKeyValueStore::new(&dir).unwrap();

        store.set("usage", "{\"requests\":1}").unwrap();
        store.set("usage", "{\"requests\":2}").unwrap();

        assert_eq!(store.get("usage").unwrap().as_deref(), Some("{\"requests\":2}"));
        assert!(dir.join("usage.json").exists());
        assert!(!dir.join("usage.json.tmp").exists());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_keys_cannot_escape_root() {
        let dir = scratch_dir();
        let store = FileKeyValueStore::new(&dir).unwrap();
        store.set("../outside", "x").unwrap();
        assert!(dir.join("___outside.json").exists());
        fs::remove_dir_all(dir).unwrap();
    }
}
