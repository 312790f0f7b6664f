//! # TestGarden: headless integration test harness
//!
//! Wraps `bevy::app::App` + `GardenPlugin` so tests can drive a session the
//! way the presentation layer does: queue actions, run an update, inspect the
//! resulting resources and events.

mod assertions;

use bevy::app::App;
use bevy::prelude::*;
use uuid::Uuid;

use crate::garden_actions::{ActionQueue, ActionResult, ActionResultLog, GardenAction};
use crate::layout::{Layout, LayoutChanged};
use crate::placement::{BedGeometry, DropPoint};
use crate::plant_catalog::{PlantCatalog, PlantDefinition, RowCount};
use crate::GardenPlugin;

/// Every `LayoutChanged` event seen since the harness was built.
#[derive(Resource, Default)]
pub struct RecordedChanges(pub Vec<LayoutChanged>);

fn record_layout_changes(
    mut events: EventReader<LayoutChanged>,
    mut recorded: ResMut<RecordedChanges>,
) {
    recorded.0.extend(events.read().copied());
}

pub struct TestGarden {
    app: App,
}

impl Default for TestGarden {
    fn default() -> Self {
        Self::new()
    }
}

impl TestGarden {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty session: no catalog entries, empty layout.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(GardenPlugin);
        app.init_resource::<RecordedChanges>();
        app.add_systems(Last, record_layout_changes);
        app.update();
        Self { app }
    }

    /// A session whose catalog holds [`sample_catalog`].
    pub fn with_sample_catalog() -> Self {
        Self::new().with_catalog(sample_catalog())
    }

    pub fn with_catalog(mut self, catalog: PlantCatalog) -> Self {
        self.app.insert_resource(catalog);
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.app.insert_resource(layout);
        self
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    pub fn update(&mut self) {
        self.app.update();
    }

    /// Queues one action, runs an update, and returns its result.
    pub fn act(&mut self, action: GardenAction) -> ActionResult {
        self.app
            .world_mut()
            .resource_mut::<ActionQueue>()
            .push(action);
        self.app.update();
        self.app
            .world()
            .resource::<ActionResultLog>()
            .last_result()
            .cloned()
            .unwrap_or(ActionResult::Success)
    }

    /// Drops `plant_id` at absolute pixel `(x, y)` on a bed at the origin.
    pub fn drop_plant(&mut self, plant_id: &str, x: f64, y: f64) -> ActionResult {
        self.act(GardenAction::DropPlant {
            plant_id: plant_id.to_string(),
            drop: DropPoint { x, y },
            bed: BedGeometry::default(),
        })
    }

    pub fn remove(&mut self, uuid: Uuid) -> ActionResult {
        self.act(GardenAction::RemovePlant { uuid })
    }

    pub fn import(&mut self, json: &str) -> ActionResult {
        self.act(GardenAction::ImportLayout {
            json: json.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn layout(&self) -> &Layout {
        self.app.world().resource::<Layout>()
    }

    pub fn catalog(&self) -> &PlantCatalog {
        self.app.world().resource::<PlantCatalog>()
    }

    pub fn recorded_changes(&self) -> &[LayoutChanged] {
        &self.app.world().resource::<RecordedChanges>().0
    }
}

/// A small catalog covering every placement branch.
pub fn sample_catalog() -> PlantCatalog {
    let defs = vec![
        PlantDefinition {
            id: "tomato".to_string(),
            name: "Tomato".to_string(),
            spacing_inches: 24.0,
            row_count: RowCount::Single,
            stagger: false,
            color: "#d33".to_string(),
            icon: "tomato.svg".to_string(),
        },
        PlantDefinition {
            id: "lettuce".to_string(),
            name: "Lettuce".to_string(),
            spacing_inches: 12.0,
            row_count: RowCount::Double,
            stagger: true,
            color: "#6c3".to_string(),
            icon: "lettuce.svg".to_string(),
        },
        PlantDefinition {
            id: "bean".to_string(),
            name: "Bush Bean".to_string(),
            spacing_inches: 6.0,
            row_count: RowCount::Double,
            stagger: false,
            color: "#393".to_string(),
            icon: "bean.svg".to_string(),
        },
    ];
    PlantCatalog::from_definitions(defs).unwrap_or_default()
}
