//! Key/value storage with browser-storage semantics.
//!
//! `SessionStorage` lives as long as the process; `DurableStorage` is a JSON
//! object on disk that survives restarts. Both store plain strings; typed
//! values go through [`StorageExt`].

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub trait Storage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// JSON helpers on top of any [`Storage`].
pub trait StorageExt: Storage {
    /// Read and decode a JSON value. A value that fails to decode is reported
    /// as [`StorageError::Corrupt`].
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Corrupt {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        self.set_item(key, &raw)
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

/// Storage scoped to the running session. Cleared when the process exits.
#[derive(Debug, Default, Clone)]
pub struct SessionStorage {
    items: BTreeMap<String, String>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// File-backed storage that survives restarts.
///
/// The whole map is rewritten on every change.
#[derive(Debug)]
pub struct DurableStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl DurableStorage {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let items = if path.exists() {
            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::ReadFailed(format!("{}: {}", path.display(), e)))?;
            match serde_json::from_str(&json) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        "Ignoring unreadable preferences file {}: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Opened durable storage at {:?} ({} keys)", path, items.len());
        Ok(Self { path, items })
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&self.items)
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        fs::write(&self.path, json)
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", self.path.display(), e)))
    }
}

impl Storage for DurableStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
