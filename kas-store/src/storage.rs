//! Key-value blob storage: the local equivalent of a browser's localStorage.
//!
//! One string value per key. The store writes the whole value on every
//! mutation, so backends only need get/set.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Errors from reading or writing a persisted blob.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("serialize transactions: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend refused the write (full, read-only, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait Storage {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Read { path, source }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::Write {
            path: self.dir.clone(),
            source,
        })?;

        // write-then-rename so a crash never leaves half a file behind
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|source| PersistError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| PersistError::Write { path, source })?;
        Ok(())
    }
}

/// In-process storage. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    reject_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one value, e.g. a blob left by an older session.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut items = HashMap::new();
        items.insert(key.into(), value.into());
        Self {
            items,
            reject_writes: false,
        }
    }

    /// Storage whose every write fails, like a full quota.
    pub fn read_only() -> Self {
        Self {
            items: HashMap::new(),
            reject_writes: true,
        }
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        if self.reject_writes {
            return Err(PersistError::Unavailable(format!("write to '{key}' rejected")));
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
