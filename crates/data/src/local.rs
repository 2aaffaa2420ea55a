//! Device-local key-value storage.
//!
//! The store is synchronous and string-valued. Each entity type lives under
//! one fixed key in the `little-things-` namespace and holds a JSON document.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use little_things_core::error::DataError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Prefix shared by every key this crate writes.
pub const KEY_PREFIX: &str = "little-things-";

/// The fixed per-entity storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Memories,
    PartnerProfile,
    Plans,
    AppSettings,
}

impl StorageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memories => "little-things-memories",
            Self::PartnerProfile => "little-things-partner-profile",
            Self::Plans => "little-things-plans",
            Self::AppSettings => "little-things-app-settings",
        }
    }
}

/// Synchronous string key-value store.
pub trait LocalStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>, DataError>;
    fn set(&self, key: &str, value: &str) -> Result<(), DataError>;
    fn remove(&self, key: &str) -> Result<(), DataError>;
}

/// Read and deserialize the document under `key`.
///
/// Data that does not parse is treated as absent and logged, so a corrupted
/// entry never blocks the application.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn LocalStore,
    key: StorageKey,
) -> Result<Option<T>, DataError> {
    let Some(raw) = store.get(key.as_str())? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key = key.as_str(), error = %e, "Ignoring unparseable local data");
            Ok(None)
        }
    }
}

/// Serialize `value` and store it under `key`.
pub fn write_json<T: Serialize>(
    store: &dyn LocalStore,
    key: StorageKey,
    value: &T,
) -> Result<(), DataError> {
    let raw = serde_json::to_string(value).map_err(|e| DataError::LocalStorage(e.to_string()))?;
    store.set(key.as_str(), &raw)
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct InMemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(
        &self,
        f: impl FnOnce(&mut HashMap<String, String>) -> R,
    ) -> Result<R, DataError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DataError::LocalStorage("local store lock poisoned".to_string()))?;
        Ok(f(&mut *entries))
    }
}

impl LocalStore for InMemoryLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, DataError> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DataError> {
        self.with_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), DataError> {
        self.with_entries(|entries| {
            entries.remove(key);
        })
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn storage_error(action: &str, path: &Path, err: std::io::Error) -> DataError {
    DataError::LocalStorage(format!("failed to {action} {}: {err}", path.display()))
}

impl LocalStore for FileLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, DataError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("read", &path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DataError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| storage_error("create", &self.dir, e))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| storage_error("write", &tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| storage_error("replace", &path, e))
    }

    fn remove(&self, key: &str) -> Result<(), DataError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove", &path, e)),
        }
    }
}
