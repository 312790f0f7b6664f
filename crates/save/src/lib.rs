//! Persistence for the garden editor: the local key/value cache, layout file
//! transfer, and append-only sync of the shared plant catalog.

#[cfg(not(target_arch = "wasm32"))]
mod atomic_write;
#[cfg(target_arch = "wasm32")]
mod browser_storage;
pub mod catalog_bootstrap;
pub mod catalog_sync;
pub mod catalog_sync_plugin;
pub mod credentials;
pub mod document_store;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_transfer;
pub mod kv_store;
pub mod layout_cache;
pub mod optimistic;
pub mod save_error;
mod save_plugin;

pub use catalog_bootstrap::CatalogSource;
pub use catalog_sync_plugin::{AppendPlantRequest, CatalogSyncEvent, RemoteCatalog};
pub use kv_store::{KeyValueStore, LocalStore};
pub use save_error::SaveError;
pub use save_plugin::SavePlugin;
