//! JSON export and import of the whole layout.
//!
//! Export is pretty-printed with a stable per-entry field order
//! (`uuid`, `plantId`, `x`, `lane`). Import is validated in two stages: the
//! text must be JSON at all (`Malformed`), and it must then decode to an
//! array of well-formed placed plants with unique uuids (`InvalidLayout`).
//! A failed import never touches the current layout.

use std::collections::HashSet;
use std::fmt;

use crate::layout::{Layout, PlacedPlant};

/// Reasons an import document is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The document is not valid JSON.
    Malformed(String),
    /// The document is JSON but not a valid layout.
    InvalidLayout(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Malformed(msg) => write!(f, "Import is not valid JSON: {msg}"),
            ImportError::InvalidLayout(msg) => write!(f, "Import is not a valid layout: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {}

/// Serializes the layout as a pretty-printed JSON array.
pub fn export_json(layout: &Layout) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(layout)
}

/// Parses and validates an exported layout document.
pub fn import_json(text: &str) -> Result<Layout, ImportError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ImportError::Malformed(e.to_string()))?;

    if !value.is_array() {
        return Err(ImportError::InvalidLayout(
            "expected a JSON array of placed plants".to_string(),
        ));
    }

    let plants: Vec<PlacedPlant> =
        serde_json::from_value(value).map_err(|e| ImportError::InvalidLayout(e.to_string()))?;

    let mut seen = HashSet::with_capacity(plants.len());
    for plant in &plants {
        if !seen.insert(plant.uuid) {
            return Err(ImportError::InvalidLayout(format!(
                "duplicate uuid {}",
                plant.uuid
            )));
        }
    }

    Ok(Layout::new(plants))
}

/// Replaces `layout` with the imported document, or leaves it untouched on
/// error. Returns the number of imported entries.
pub fn apply_import(layout: &mut Layout, text: &str) -> Result<usize, ImportError> {
    let imported = import_json(text)?;
    let count = imported.len();
    *layout = imported;
    Ok(count)
}
