//! Layout cache under the `garden_layout` key.
//!
//! Restored once at startup and rewritten after every layout mutation. A
//! missing or unreadable cache starts the session with an empty layout.

use bevy::prelude::*;
use garden::config::LAYOUT_STORAGE_KEY;
use garden::layout::{Layout, LayoutChanged};
use garden::layout_io::{export_json, import_json};
use garden::notifications::NotificationEvent;

use crate::kv_store::{KeyValueStore, LocalStore};
use crate::save_error::SaveError;

/// Reads the cached layout, falling back to empty on any problem.
pub fn restore_layout(store: &dyn KeyValueStore) -> Layout {
    let text = match store.get(LAYOUT_STORAGE_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return Layout::default(),
        Err(e) => {
            warn!("Layout cache unreadable, starting empty: {e}");
            return Layout::default();
        }
    };
    match import_json(&text) {
        Ok(layout) => layout,
        Err(e) => {
            warn!("Discarding corrupt layout cache: {e}");
            Layout::default()
        }
    }
}

pub fn persist_layout(store: &dyn KeyValueStore, layout: &Layout) -> Result<(), SaveError> {
    let text = export_json(layout).map_err(|e| SaveError::Encode(e.to_string()))?;
    store.set(LAYOUT_STORAGE_KEY, &text)
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub(crate) fn restore_layout_on_startup(store: Res<LocalStore>, mut layout: ResMut<Layout>) {
    let restored = restore_layout(store.store());
    info!("Restored {} placed plants from cache", restored.len());
    *layout = restored;
}

/// Writes the cache once per frame in which the layout changed.
pub(crate) fn persist_layout_on_change(
    mut changes: EventReader<LayoutChanged>,
    store: Res<LocalStore>,
    layout: Res<Layout>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    if changes.read().count() == 0 {
        return;
    }
    if let Err(e) = persist_layout(store.store(), &layout) {
        error!("Layout cache write failed: {e}");
        notifications.send(NotificationEvent::warning(format!(
            "Could not save layout locally: {e}"
        )));
    }
}
