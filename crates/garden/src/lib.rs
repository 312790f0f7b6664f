//! Garden layout engine.
//!
//! Holds the session state of the bed editor as Bevy resources (plant
//! catalog, layout, id RNG) and the pure placement and import/export logic
//! that mutates it. Persistence lives in the `save` crate; this crate never
//! touches storage.

use bevy::prelude::*;

pub mod config;
pub mod garden_actions;
pub mod garden_rng;
pub mod layout;
pub mod layout_io;
pub mod notifications;
pub mod placement;
pub mod plant_catalog;
pub mod session_protocol;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use layout::{Lane, Layout, LayoutChanged, PlacedPlant};
pub use plant_catalog::{PlantCatalog, PlantDefinition, RowCount};

/// Ordering of garden work inside `Update`: actions mutate the layout first,
/// then effect systems (persistence, sync) observe the resulting events.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GardenSet {
    Actions,
    Effects,
}

pub struct GardenPlugin;

impl Plugin for GardenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlantCatalog>()
            .init_resource::<Layout>()
            .init_resource::<garden_rng::GardenRng>()
            .add_event::<LayoutChanged>()
            .configure_sets(Update, (GardenSet::Actions, GardenSet::Effects).chain());

        app.add_plugins((
            notifications::NotificationsPlugin,
            garden_actions::GardenActionsPlugin,
        ));
    }
}
