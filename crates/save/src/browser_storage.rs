//! `localStorage` backend for the browser build.
//!
//! The `Storage` handle is looked up on every call rather than cached: JS
//! handles are not `Send`, and the store must be shareable as a resource.

use web_sys::Storage;

use crate::kv_store::KeyValueStore;
use crate::save_error::SaveError;

pub struct BrowserStorage;

fn local_storage() -> Result<Storage, SaveError> {
    let window =
        web_sys::window().ok_or_else(|| SaveError::Storage("no window".to_string()))?;
    window
        .local_storage()
        .map_err(|e| SaveError::Storage(format!("localStorage error: {:?}", e)))?
        .ok_or_else(|| SaveError::Storage("localStorage not available".to_string()))
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SaveError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| SaveError::Storage(format!("failed to read '{key}': {:?}", e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SaveError> {
        local_storage()?.set_item(key, value).map_err(|e| {
            let detail = format!("{:?}", e);
            if detail.contains("QuotaExceededError") {
                SaveError::Storage("storage full; clear browser data and retry".to_string())
            } else {
                SaveError::Storage(format!("failed to write '{key}': {detail}"))
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), SaveError> {
        local_storage()?
            .remove_item(key)
            .map_err(|e| SaveError::Storage(format!("failed to remove '{key}': {:?}", e)))
    }
}
