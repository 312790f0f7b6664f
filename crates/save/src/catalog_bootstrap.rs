//! Startup load of the plant catalog.

use std::path::PathBuf;

use bevy::prelude::*;
use garden::notifications::NotificationEvent;
use garden::plant_catalog::{CatalogError, PlantCatalog};

/// Where the session catalog comes from.
#[derive(Resource, Debug, Clone, Default)]
pub enum CatalogSource {
    /// Keep whatever `PlantCatalog` is already in the world.
    #[default]
    None,
    File(PathBuf),
    Inline(String),
}

/// A catalog loaded at startup, with the definitions that were left out.
#[derive(Debug)]
pub struct LoadedCatalog {
    pub catalog: PlantCatalog,
    pub skipped: Vec<CatalogError>,
}

/// Reads the catalog source. A bad definition is skipped rather than failing
/// the whole load; an unreadable or non-array document is an error.
pub fn load_catalog(source: &CatalogSource) -> Result<Option<LoadedCatalog>, CatalogError> {
    let text = match source {
        CatalogSource::None => return Ok(None),
        CatalogSource::Inline(text) => text.clone(),
        CatalogSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Parse(format!("cannot read {}: {e}", path.display()))
        })?,
    };
    let (catalog, skipped) = PlantCatalog::from_json_lenient(&text)?;
    Ok(Some(LoadedCatalog { catalog, skipped }))
}

/// A catalog that fails to load leaves the session with an empty one.
pub(crate) fn bootstrap_catalog(
    source: Res<CatalogSource>,
    mut catalog: ResMut<PlantCatalog>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    match load_catalog(&source) {
        Ok(Some(LoadedCatalog {
            catalog: loaded,
            skipped,
        })) => {
            for e in &skipped {
                warn!("Skipped plant definition: {e}");
            }
            if !skipped.is_empty() {
                notifications.send(NotificationEvent::warning(format!(
                    "Skipped {} invalid plant definition(s)",
                    skipped.len()
                )));
            }
            info!("Loaded {} plant definitions", loaded.len());
            *catalog = loaded;
        }
        Ok(None) => {}
        Err(e) => {
            warn!("Plant catalog failed to load: {e}");
            *catalog = PlantCatalog::default();
            notifications.send(NotificationEvent::warning(format!(
                "Plant catalog unavailable: {e}"
            )));
        }
    }
}
