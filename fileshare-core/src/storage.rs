//! Durable key/value storage for the session
//!
//! Holds two string entries: the bearer token and a JSON snapshot of the
//! signed-in user. `FileStorage` keeps them in a single JSON file that is
//! rewritten synchronously on every change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    NoDirFound,
}

/// String key/value store shared by the API client and the session store
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

type Entries = BTreeMap<String, String>;

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    // A poisoned map is still a valid map.
    entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<Entries>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object file on disk
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStorage {
    /// Default session file location
    ///
    /// - Linux: ~/.local/share/fileshare/session.json
    /// - macOS: ~/Library/Application Support/fileshare/session.json
    /// - Windows: %APPDATA%\fileshare\session.json
    pub fn default_path() -> Result<PathBuf, StorageError> {
        dirs::data_dir()
            .map(|p| p.join("fileshare").join("session.json"))
            .ok_or(StorageError::NoDirFound)
    }

    /// Open the session file at `path`
    ///
    /// A missing, empty or unparsable file starts out empty; the next write
    /// replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Entries::new()
            } else {
                serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    Entries::new()
                })
            }
        } else {
            Entries::new()
        };

        tracing::debug!("Session storage at {}", path.display());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("authToken").unwrap(), None);

        storage.set("authToken", "abc").unwrap();
        assert_eq!(storage.get("authToken").unwrap().as_deref(), Some("abc"));

        storage.remove("authToken").unwrap();
        assert_eq!(storage.get("authToken").unwrap(), None);
    }

    #[test]
    fn test_file_storage_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set("authToken", "tok-1").unwrap();
        storage.set("userData", r#"{"name":"Ada"}"#).unwrap();
        assert!(path.exists());

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("authToken").unwrap().as_deref(), Some("tok-1"));
        assert_eq!(
            reopened.get("userData").unwrap().as_deref(),
            Some(r#"{"name":"Ada"}"#)
        );

        reopened.remove("authToken").unwrap();
        let again = FileStorage::open(&path).unwrap();
        assert_eq!(again.get("authToken").unwrap(), None);
        assert!(again.get("userData").unwrap().is_some());
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(storage.get("userData").unwrap(), None);
        // Removing from an empty store does not create the file
        storage.remove("userData").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_recovers_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"authToken":"t""#).unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get("authToken").unwrap(), None);

        storage.set("authToken", "fresh").unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get("authToken").unwrap().as_deref(), Some("fresh"));
    }
}
