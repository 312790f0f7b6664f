//! Runtime settings read from the environment.

use std::path::PathBuf;

use save::catalog_sync::CATALOG_DOCUMENT_PATH;
use save::document_store::DocumentAddress;

pub const STORE_DIR_VAR: &str = "GARDEN_STORE_DIR";
pub const CATALOG_VAR: &str = "GARDEN_CATALOG";
pub const REMOTE_ROOT_VAR: &str = "GARDEN_REMOTE_ROOT";
pub const REPO_OWNER_VAR: &str = "GARDEN_REPO_OWNER";
pub const REPO_NAME_VAR: &str = "GARDEN_REPO_NAME";
pub const CATALOG_PATH_VAR: &str = "GARDEN_CATALOG_PATH";

const DEFAULT_STORE_DIR: &str = ".garden";
const DEFAULT_CATALOG: &str = "plants.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Directory backing the local key/value store.
    pub store_dir: PathBuf,
    /// Bootstrap catalog loaded once at startup.
    pub catalog: PathBuf,
    pub remote: Option<RemoteSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSettings {
    /// Root of the file-backed document store.
    pub root: PathBuf,
    pub address: DocumentAddress,
}

impl SessionSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store_dir = PathBuf::from(var(STORE_DIR_VAR).unwrap_or_else(|| DEFAULT_STORE_DIR.into()));
        let catalog = PathBuf::from(var(CATALOG_VAR).unwrap_or_else(|| DEFAULT_CATALOG.into()));

        let remote = match (var(REPO_OWNER_VAR), var(REPO_NAME_VAR)) {
            (Some(owner), Some(repo)) => {
                let root = var(REMOTE_ROOT_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| store_dir.join("remote"));
                let path = var(CATALOG_PATH_VAR).unwrap_or_else(|| CATALOG_DOCUMENT_PATH.into());
                Some(RemoteSettings {
                    root,
                    address: DocumentAddress::new(owner, repo, path),
                })
            }
            _ => None,
        };

        Self {
            store_dir,
            catalog,
            remote,
        }
    }
}
