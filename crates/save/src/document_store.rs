//! Versioned remote documents with compare-and-swap writes.
//!
//! A `DocumentStore` hands out a `VersionToken` with every read; a write
//! only lands if the document still carries the token the writer read.
//! Tokens are the xxh32 digest of the document bytes, so two stores holding
//! identical content agree on its version.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use xxhash_rust::xxh32::xxh32;

use crate::credentials::Credential;
use crate::save_error::SaveError;

const VERSION_SEED: u32 = 0;

/// `owner/repo:path`, the identity of one remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentAddress {
    pub owner: String,
    pub repo: String,
    pub path: String,
}

impl DocumentAddress {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for DocumentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.owner, self.repo, self.path)
    }
}

/// Opaque revision identifier of a remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn for_content(content: &[u8]) -> Self {
        Self(format!("{:08x}", xxh32(content, VERSION_SEED)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedDocument {
    pub content: Vec<u8>,
    pub version: VersionToken,
}

impl VersionedDocument {
    pub fn new(content: Vec<u8>) -> Self {
        let version = VersionToken::for_content(&content);
        Self { content, version }
    }
}

pub trait DocumentStore: Send + Sync {
    fn read(
        &self,
        address: &DocumentAddress,
        credential: &Credential,
    ) -> Result<VersionedDocument, SaveError>;

    /// Replaces the document if its current version is `expected`.
    ///
    /// Returns the new version. A stale `expected` fails with
    /// `SaveError::ConcurrentModification` and leaves the document as is.
    fn write(
        &self,
        address: &DocumentAddress,
        content: &[u8],
        expected: &VersionToken,
        message: &str,
        credential: &Credential,
    ) -> Result<VersionToken, SaveError>;
}

/// One accepted write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub address: DocumentAddress,
    pub message: String,
    pub version: VersionToken,
}

fn check_version(
    current: &VersionToken,
    expected: &VersionToken,
) -> Result<(), SaveError> {
    if current == expected {
        Ok(())
    } else {
        Err(SaveError::ConcurrentModification {
            expected: expected.to_string(),
            found: current.to_string(),
        })
    }
}

// =============================================================================
// In-memory store
// =============================================================================

#[derive(Default)]
struct MemoryState {
    documents: HashMap<DocumentAddress, Vec<u8>>,
    commits: Vec<CommitRecord>,
}

/// Document store held in memory. Used by tests and offline sessions.
#[derive(Default)]
pub struct MemoryDocumentStore {
    state: Mutex<MemoryState>,
    accepted_credential: Option<String>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, address: DocumentAddress, content: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.documents.insert(address, content.into());
        }
        self
    }

    /// Rejects reads and writes that present any other token.
    pub fn accepting_only(mut self, token: impl Into<String>) -> Self {
        self.accepted_credential = Some(token.into());
        self
    }

    pub fn document(&self, address: &DocumentAddress) -> Option<Vec<u8>> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.documents.get(address).cloned())
    }

    /// Overwrites a document without a version check, as another client would.
    pub fn force_put(&self, address: &DocumentAddress, content: impl Into<Vec<u8>>) {
        if let Ok(mut state) = self.state.lock() {
            state.documents.insert(address.clone(), content.into());
        }
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.state
            .lock()
            .map(|state| state.commits.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, SaveError> {
        self.state
            .lock()
            .map_err(|_| SaveError::RemoteSync("document store lock poisoned".to_string()))
    }

    fn authorize(&self, credential: &Credential) -> Result<(), SaveError> {
        match &self.accepted_credential {
            Some(token) if token != credential.expose() => {
                Err(SaveError::RemoteSync("bad credentials".to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(
        &self,
        address: &DocumentAddress,
        credential: &Credential,
    ) -> Result<VersionedDocument, SaveError> {
        self.authorize(credential)?;
        let state = self.lock()?;
        let content = state
            .documents
            .get(address)
            .cloned()
            .ok_or_else(|| SaveError::RemoteSync(format!("{address} not found")))?;
        Ok(VersionedDocument::new(content))
    }

    fn write(
        &self,
        address: &DocumentAddress,
        content: &[u8],
        expected: &VersionToken,
        message: &str,
        credential: &Credential,
    ) -> Result<VersionToken, SaveError> {
        self.authorize(credential)?;
        let mut state = self.lock()?;
        let current = state
            .documents
            .get(address)
            .map(|bytes| VersionToken::for_content(bytes))
            .ok_or_else(|| SaveError::RemoteSync(format!("{address} not found")))?;
        check_version(&current, expected)?;

        let version = VersionToken::for_content(content);
        state.documents.insert(address.clone(), content.to_vec());
        state.commits.push(CommitRecord {
            address: address.clone(),
            message: message.to_string(),
            version: version.clone(),
        });
        Ok(version)
    }
}

// =============================================================================
// Directory-backed store (native)
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use fs_store::FsDocumentStore;

#[cfg(not(target_arch = "wasm32"))]
mod fs_store {
    use std::io::Write;
    use std::path::{Component, Path, PathBuf};
    use std::sync::Mutex;

    use bevy::prelude::*;

    use super::{check_version, DocumentAddress, DocumentStore, VersionToken, VersionedDocument};
    use crate::atomic_write::atomic_write;
    use crate::credentials::Credential;
    use crate::save_error::SaveError;

    const COMMIT_LOG: &str = "commits.log";

    /// Documents stored at `<root>/<owner>/<repo>/<path>`.
    ///
    /// Every accepted write appends `<version> <path> <message>` to
    /// `<root>/<owner>/<repo>/commits.log`. Writes within one process are
    /// serialized; the store does not coordinate with other processes.
    pub struct FsDocumentStore {
        root: PathBuf,
        write_lock: Mutex<()>,
    }

    impl FsDocumentStore {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self {
                root: root.into(),
                write_lock: Mutex::new(()),
            }
        }

        pub fn root(&self) -> &Path {
            &self.root
        }

        fn repo_dir(&self, address: &DocumentAddress) -> Result<PathBuf, SaveError> {
            for part in [&address.owner, &address.repo] {
                if part.is_empty() || part.contains(['/', '\\']) || part == ".." {
                    return Err(SaveError::RemoteSync(format!(
                        "invalid repository segment '{part}'"
                    )));
                }
            }
            Ok(self.root.join(&address.owner).join(&address.repo))
        }

        fn document_path(&self, address: &DocumentAddress) -> Result<PathBuf, SaveError> {
            let relative = Path::new(&address.path);
            let escapes = relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if address.path.is_empty() || escapes {
                return Err(SaveError::RemoteSync(format!(
                    "invalid document path '{}'",
                    address.path
                )));
            }
            Ok(self.repo_dir(address)?.join(relative))
        }

        fn read_bytes(&self, address: &DocumentAddress) -> Result<Vec<u8>, SaveError> {
            let path = self.document_path(address)?;
            std::fs::read(&path).map_err(|e| SaveError::RemoteSync(format!("read {address}: {e}")))
        }

        fn append_commit(
            &self,
            address: &DocumentAddress,
            version: &VersionToken,
            message: &str,
        ) -> std::io::Result<()> {
            let log_path = self.repo_dir_unchecked(address).join(COMMIT_LOG);
            let mut log = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;
            let message = message.replace('\n', " ");
            writeln!(log, "{version} {} {message}", address.path)
        }

        fn repo_dir_unchecked(&self, address: &DocumentAddress) -> PathBuf {
            self.root.join(&address.owner).join(&address.repo)
        }

        /// Accepted change messages for one repository, oldest first.
        pub fn commit_messages(&self, address: &DocumentAddress) -> Result<Vec<String>, SaveError> {
            let log_path = self.repo_dir(address)?.join(COMMIT_LOG);
            let text = match std::fs::read_to_string(log_path) {
                Ok(text) => text,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(SaveError::RemoteSync(e.to_string())),
            };
            Ok(text
                .lines()
                .filter_map(|line| line.splitn(3, ' ').nth(2))
                .map(str::to_string)
                .collect())
        }
    }

    impl DocumentStore for FsDocumentStore {
        fn read(
            &self,
            address: &DocumentAddress,
            _credential: &Credential,
        ) -> Result<VersionedDocument, SaveError> {
            Ok(VersionedDocument::new(self.read_bytes(address)?))
        }

        fn write(
            &self,
            address: &DocumentAddress,
            content: &[u8],
            expected: &VersionToken,
            message: &str,
            _credential: &Credential,
        ) -> Result<VersionToken, SaveError> {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| SaveError::RemoteSync("document store lock poisoned".to_string()))?;

            let current = VersionToken::for_content(&self.read_bytes(address)?);
            check_version(&current, expected)?;

            let path = self.document_path(address)?;
            atomic_write(&path, content)
                .map_err(|e| SaveError::RemoteSync(format!("write {address}: {e}")))?;
            let version = VersionToken::for_content(content);
            if let Err(e) = self.append_commit(address, &version, message) {
                warn!("Commit log append failed for {address}: {e}");
            }
            Ok(version)
        }
    }
}
