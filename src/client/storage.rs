//! Key-value client storage. The durable store survives restarts and holds
//! the bearer and activation tokens; a second, short-lived store bridges the
//! checkout screen and the processor's return screen.
//!
//! `FileStore` re-reads its file on every `get`, so a token written by another
//! process is observed on the next read instead of being cached in memory.

use super::errors::AppError;
use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError, RwLock},
};
use tracing::warn;

/// Storage capability shared by the stores.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns `AppError::Storage` when the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// # Errors
    /// Returns `AppError::Storage` when the backing medium cannot be updated.
    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// In-process storage, used for session-scoped data and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// JSON file on disk holding a flat string map.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Storage(format!(
                    "Failed to parse {}: {err}",
                    self.path.display()
                ))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(AppError::Storage(format!(
                "Failed to read {}: {err}",
                self.path.display()
            ))),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| {
                    AppError::Storage(format!("Failed to create {}: {err}", parent.display()))
                })?;
            }
        }

        let payload = serde_json::to_string_pretty(entries)
            .map_err(|err| AppError::Serialization(format!("Failed to encode storage: {err}")))?;

        // Write-then-rename so a concurrent reader never sees a torn file.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, payload).map_err(|err| {
            AppError::Storage(format!("Failed to write {}: {err}", staging.display()))
        })?;
        fs::rename(&staging, &self.path).map_err(|err| {
            AppError::Storage(format!("Failed to replace {}: {err}", self.path.display()))
        })
    }

    fn update(
        &self,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.read_entries()?;
        apply(&mut entries);
        self.write_entries(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(err) => {
                warn!("storage read failed: {err}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStore, KeyValueStore, MemoryStore};
    use std::fs;

    fn scratch_path() -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("coursehub-{}", uuid::Uuid::new_v4().simple()))
            .join("state.json")
    }

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token"), None);

        store.set("token", "t1").ok();
        assert_eq!(store.get("token").as_deref(), Some("t1"));

        store.remove("token").ok();
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let path = scratch_path();
        let first = FileStore::new(&path);
        assert!(first.set("token", "t1").is_ok());
        assert!(first.set("activationToken", "a1").is_ok());

        let second = FileStore::new(&path);
        assert_eq!(second.get("token").as_deref(), Some("t1"));
        assert_eq!(second.get("activationToken").as_deref(), Some("a1"));

        assert!(second.remove("token").is_ok());
        assert_eq!(first.get("token"), None);

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn file_store_missing_file_reads_empty() {
        let store = FileStore::new(scratch_path());
        assert_eq!(store.get("token"), None);
        assert!(store.remove("token").is_ok());
    }

    #[test]
    fn file_store_corrupt_file_reads_none() {
        let path = scratch_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok();
        }
        fs::write(&path, "not json").ok();

        let store = FileStore::new(&path);
        assert_eq!(store.get("token"), None);
        assert!(store.set("token", "t1").is_err());

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
