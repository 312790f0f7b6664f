// ---------------------------------------------------------------------------
// SaveError: error type for every persistence operation
// ---------------------------------------------------------------------------

use std::fmt;

use garden::layout_io::ImportError;
use garden::plant_catalog::CatalogError;

/// Errors raised by local storage, file transfer and remote catalog sync.
///
/// Every operation that returns one has left local state (layout, catalog)
/// and the remote document exactly as they were.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error on a local file.
    Io(std::io::Error),
    /// The key/value store rejected a read or write.
    Storage(String),
    /// Serializing a document failed.
    Encode(String),
    /// An imported document is not valid JSON.
    MalformedInput(String),
    /// An imported document is JSON but not a valid layout.
    InvalidLayout(String),
    /// A plant definition was rejected before reaching the remote store.
    Catalog(CatalogError),
    /// Reading, decoding or writing the remote catalog document failed.
    RemoteSync(String),
    /// The remote document changed between read and write.
    ConcurrentModification { expected: String, found: String },
    /// No remote access credential is stored.
    MissingCredential,
    /// No remote catalog is configured for this session.
    NotConfigured,
    /// Another catalog append is still running.
    AppendInFlight,
}

impl SaveError {
    /// `true` for remote failures, including version conflicts.
    pub fn is_remote_sync(&self) -> bool {
        matches!(
            self,
            SaveError::RemoteSync(_) | SaveError::ConcurrentModification { .. }
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SaveError::ConcurrentModification { .. })
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Storage(msg) => write!(f, "Storage error: {msg}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::MalformedInput(msg) => write!(f, "Malformed input: {msg}"),
            SaveError::InvalidLayout(msg) => write!(f, "Invalid layout: {msg}"),
            SaveError::Catalog(e) => write!(f, "{e}"),
            SaveError::RemoteSync(msg) => write!(f, "Remote catalog sync failed: {msg}"),
            SaveError::ConcurrentModification { expected, found } => write!(
                f,
                "Remote catalog changed during update (expected version {expected}, found {found})"
            ),
            SaveError::MissingCredential => {
                write!(f, "No access token stored; supply one before adding plants")
            }
            SaveError::NotConfigured => write!(f, "No remote catalog is configured"),
            SaveError::AppendInFlight => write!(f, "Another plant is still being added"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            SaveError::Catalog(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<ImportError> for SaveError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::Malformed(msg) => SaveError::MalformedInput(msg),
            ImportError::InvalidLayout(msg) => SaveError::InvalidLayout(msg),
        }
    }
}

impl From<CatalogError> for SaveError {
    fn from(e: CatalogError) -> Self {
        SaveError::Catalog(e)
    }
}
