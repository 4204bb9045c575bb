use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value persisted state: one opaque JSON blob per string key, held as
/// a file under the data directory. No versioning or migration contract.
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(LocalStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reads and deserializes the blob under `key`. A missing key is
    /// `None`; a present but malformed blob is an error.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(self.path(key), bytes)?;
        Ok(())
    }

    /// Removes the blob under `key`; returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path(key).exists()
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}
