// Key-value storage backing the saved itinerary
// The repository only needs get/set/remove on a single key, so the seam is a
// small trait with an in-memory and a file-backed implementation

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub trait KeyValueStore: Send + Sync + 'static {
    // None when nothing has been stored under the key
    fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError>;

    fn set(&self, key: &str, value: Bytes) -> Result<(), StorageError>;

    // Returns true if an entry was removed
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: Bytes) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Stores each key as `<dir>/<key>.json`. Writes go through a temporary
/// file and a rename so a reader never sees a half-written snapshot.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

// Keys become file names: plain ASCII, no separators, no leading dot
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: Bytes) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));

        let _guard = self.write_lock.lock();
        fs::create_dir_all(&self.dir)?;
        fs::write(&tmp_path, &value)?;
        fs::rename(&tmp_path, &path)?;

        debug!(path = %path.display(), bytes = value.len(), "Wrote store entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
