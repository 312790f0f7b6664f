use bevy::prelude::*;
use garden::GardenSet;

use crate::catalog_bootstrap::{bootstrap_catalog, CatalogSource};
use crate::catalog_sync_plugin::CatalogSyncPlugin;
use crate::kv_store::LocalStore;
use crate::layout_cache::{persist_layout_on_change, restore_layout_on_startup};

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Local persistence and remote catalog sync for a garden session.
///
/// Uses the `LocalStore` already in the world, or the platform default
/// (`localStorage` in the browser, `.garden/` natively). At startup the
/// catalog is loaded from `CatalogSource` and the cached layout restored;
/// afterwards every layout change is written back to the cache.
pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<LocalStore>() {
            app.insert_resource(LocalStore::platform_default());
        }
        app.init_resource::<CatalogSource>();

        app.add_systems(
            Startup,
            (bootstrap_catalog, restore_layout_on_startup).chain(),
        );
        app.add_systems(Update, persist_layout_on_change.in_set(GardenSet::Effects));

        app.add_plugins(CatalogSyncPlugin);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garden::config::LAYOUT_STORAGE_KEY;
    use garden::garden_actions::{ActionQueue, GardenAction};
    use garden::layout::Layout;
    use garden::placement::{BedGeometry, DropPoint};
    use garden::plant_catalog::PlantCatalog;
    use garden::test_harness::sample_catalog;
    use garden::GardenPlugin;

    fn app_with_store(store: LocalStore, source: CatalogSource) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(store)
            .insert_resource(source)
            .add_plugins((GardenPlugin, SavePlugin));
        app.update();
        app
    }

    fn inline_sample() -> CatalogSource {
        CatalogSource::Inline(sample_catalog().to_json_pretty().unwrap())
    }

    fn drop_tomato(app: &mut App) {
        app.world_mut()
            .resource_mut::<ActionQueue>()
            .push(GardenAction::DropPlant {
                plant_id: "tomato".to_string(),
                drop: DropPoint { x: 240.0, y: 50.0 },
                bed: BedGeometry::default(),
            });
        app.update();
    }

    #[test]
    fn test_startup_loads_catalog() {
        let app = app_with_store(LocalStore::memory(), inline_sample());
        assert_eq!(
            app.world().resource::<PlantCatalog>().len(),
            sample_catalog().len()
        );
    }

    #[test]
    fn test_bad_catalog_leaves_catalog_empty() {
        let app = app_with_store(
            LocalStore::memory(),
            CatalogSource::Inline("not json".to_string()),
        );
        assert!(app.world().resource::<PlantCatalog>().is_empty());
    }

    #[test]
    fn test_layout_change_is_cached_and_restored() {
        let store = LocalStore::memory();
        let mut app = app_with_store(store.clone(), inline_sample());
        drop_tomato(&mut app);

        let cached = store.store().get(LAYOUT_STORAGE_KEY).unwrap();
        assert!(cached.unwrap().contains("\"plantId\": \"tomato\""));
        let saved = app.world().resource::<Layout>().clone();
        assert_eq!(saved.len(), 1);

        let restored = app_with_store(store, inline_sample());
        assert_eq!(*restored.world().resource::<Layout>(), saved);
    }

    #[test]
    fn test_corrupt_cache_starts_empty() {
        let store = LocalStore::memory();
        store.store().set(LAYOUT_STORAGE_KEY, "{oops").unwrap();
        let app = app_with_store(store, inline_sample());
        assert!(app.world().resource::<Layout>().is_empty());
    }

    #[test]
    fn test_no_write_without_change() {
        let store = LocalStore::memory();
        let mut app = app_with_store(store.clone(), inline_sample());
        app.update();
        assert_eq!(store.store().get(LAYOUT_STORAGE_KEY).unwrap(), None);

        app.world_mut()
            .resource_mut::<ActionQueue>()
            .push(GardenAction::ClearLayout);
        app.update();
        assert_eq!(
            store.store().get(LAYOUT_STORAGE_KEY).unwrap().as_deref(),
            Some("[]")
        );
    }
}
