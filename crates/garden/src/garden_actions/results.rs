use serde::{Deserialize, Serialize};

use crate::layout::PlacedPlant;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionResult {
    Success,
    /// A drop produced this new layout entry.
    Placed(PlacedPlant),
    /// An import replaced the layout with `count` entries.
    Imported { count: usize },
    Error(ActionError),
}

impl ActionResult {
    /// Returns `true` for every variant except `Error`.
    pub fn is_success(&self) -> bool {
        !matches!(self, ActionResult::Error(_))
    }

    pub fn error(&self) -> Option<&ActionError> {
        match self {
            ActionResult::Error(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionError {
    /// The dropped plant id is not in the catalog.
    UnknownPlant(String),
    /// The import document is not JSON.
    MalformedInput(String),
    /// The import document is JSON but not a layout.
    InvalidLayout(String),
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::UnknownPlant(id) => write!(f, "Unknown plant '{id}'"),
            ActionError::MalformedInput(msg) => write!(f, "Import is not valid JSON: {msg}"),
            ActionError::InvalidLayout(msg) => write!(f, "Import is not a valid layout: {msg}"),
        }
    }
}

impl From<crate::layout_io::ImportError> for ActionError {
    fn from(e: crate::layout_io::ImportError) -> Self {
        match e {
            crate::layout_io::ImportError::Malformed(msg) => ActionError::MalformedInput(msg),
            crate::layout_io::ImportError::InvalidLayout(msg) => ActionError::InvalidLayout(msg),
        }
    }
}
