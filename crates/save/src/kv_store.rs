//! Local key/value storage.
//!
//! The browser build stores strings in `localStorage`; native builds keep one
//! JSON file per key in a directory; tests use the in-memory store. Writes
//! are synchronous and best effort: the store is a cache for the session,
//! not a source of truth.

use std::collections::BTreeMap;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::save_error::SaveError;

pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>, SaveError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SaveError>;
    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), SaveError>;
}

/// The session's key/value store.
#[derive(Resource, Clone)]
pub struct LocalStore(pub Arc<dyn KeyValueStore>);

impl LocalStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self(Arc::new(store))
    }

    pub fn memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// `localStorage` in the browser, `.garden/` in the working directory
    /// otherwise.
    pub fn platform_default() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            Self::new(crate::browser_storage::BrowserStorage)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::new(DirectoryStore::new(".garden"))
        }
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.0.as_ref()
    }
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, SaveError> {
        self.entries
            .lock()
            .map_err(|_| SaveError::Storage("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SaveError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

// =============================================================================
// Directory-backed store (native)
// =============================================================================

/// Stores each key as `<root>/<key>.json`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SaveError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(SaveError::Storage(format!("invalid storage key '{key}'")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        match std::fs::read_to_string(self.path_for(key)?) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SaveError> {
        crate::atomic_write::atomic_write(&self.path_for(key)?, value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        match std::fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
