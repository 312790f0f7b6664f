//! Layout export to and import from JSON files on disk.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use garden::config::EXPORT_FILE_NAME;
use garden::layout::Layout;
use garden::layout_io::{export_json, import_json};

use crate::atomic_write::atomic_write;
use crate::save_error::SaveError;

/// `garden-plan.json` inside `dir`.
pub fn default_export_path(dir: &Path) -> PathBuf {
    dir.join(EXPORT_FILE_NAME)
}

/// Writes the layout as pretty JSON, replacing any existing file.
pub fn export_layout_file(path: &Path, layout: &Layout) -> Result<(), SaveError> {
    let text = export_json(layout).map_err(|e| SaveError::Encode(e.to_string()))?;
    atomic_write(path, text.as_bytes())?;
    info!("Exported {} plants to {}", layout.len(), path.display());
    Ok(())
}

/// Reads a layout file as text without validating its contents.
pub fn read_layout_file(path: &Path) -> Result<String, SaveError> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes)
        .map_err(|e| SaveError::MalformedInput(format!("file is not UTF-8: {e}")))
}

/// Reads and validates a layout file. The caller decides whether to apply it.
pub fn import_layout_file(path: &Path) -> Result<Layout, SaveError> {
    Ok(import_json(&read_layout_file(path)?)?)
}
