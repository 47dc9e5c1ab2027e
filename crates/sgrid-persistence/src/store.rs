//! Durable string key/value storage.
//!
//! Mirrors what a browser's local storage offers: string keys, string values,
//! survives restarts. [`MemoryStore`] is the in-process variant for tests and
//! embedded hosts; [`FileStore`] keeps everything in one JSON file.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PersistenceError, Result};

/// File name used under the platform data directory.
pub const DEFAULT_FILE_NAME: &str = "grid-storage.json";

/// Key/value storage that outlives the process.
pub trait DurableStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Storage kept in a single JSON object on disk.
///
/// Every write rewrites the whole file through a temp file and rename, so a
/// crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => {
                    debug!(path = %path.display(), entries = entries.len(), "loaded grid storage");
                    entries
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "grid storage is corrupt, starting empty");
                    BTreeMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => {
                warn!(path = %path.display(), %error, "grid storage unreadable, starting empty");
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: RefCell::new(entries),
        }
    }

    /// Open the store under the platform data directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(Self::default_path()?))
    }

    /// Default storage path under the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        directories::ProjectDirs::from("com", "sgrid", "sgrid")
            .map(|dirs| dirs.data_dir().join(DEFAULT_FILE_NAME))
            .ok_or(PersistenceError::NoDataDirectory)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&*self.entries.borrow())
            .map_err(|source| PersistenceError::Serialization { source })?;
        write_atomic(&self.path, &bytes)
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.entries.borrow_mut().remove(key).is_some();
        if removed { self.flush() } else { Ok(()) }
    }
}

/// Write `bytes` to `path` via a sibling temp file and rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|e| PersistenceError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(bytes).map_err(|e| PersistenceError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| PersistenceError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| PersistenceError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    debug!(path = %path.display(), "grid storage written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", "1".into()).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = FileStore::open(&path);
        store.set("grid", "[0,2]".into()).unwrap();
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("grid").as_deref(), Some("[0,2]"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get("grid"), None);
        store.set("grid", "[1]".into()).unwrap();
        assert_eq!(FileStore::open(&path).get("grid").as_deref(), Some("[1]"));
    }
}
