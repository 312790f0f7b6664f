//! The layout: an ordered collection of plants placed on the bed.
//!
//! Insertion order is display and export order. Entries reference catalog
//! definitions by id; references that no longer resolve are skipped by
//! readers rather than treated as errors.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plant_catalog::{PlantCatalog, PlantDefinition};

// =============================================================================
// Lane
// =============================================================================

/// One of the two horizontal rows within the bed. Serialized as 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Lane {
    #[default]
    Top,
    Bottom,
}

impl TryFrom<u8> for Lane {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Lane::Top),
            1 => Ok(Lane::Bottom),
            other => Err(format!("lane must be 0 or 1, got {other}")),
        }
    }
}

impl From<Lane> for u8 {
    fn from(lane: Lane) -> Self {
        match lane {
            Lane::Top => 0,
            Lane::Bottom => 1,
        }
    }
}

// =============================================================================
// Placed plant
// =============================================================================

/// A single plant instance on the bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedPlant {
    pub uuid: Uuid,
    pub plant_id: String,
    /// Inches from the bed's left edge.
    pub x: u32,
    pub lane: Lane,
}

// =============================================================================
// Layout resource
// =============================================================================

/// Ordered sequence of placed plants; the unit of caching and export.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    plants: Vec<PlacedPlant>,
}

impl Layout {
    pub fn new(plants: Vec<PlacedPlant>) -> Self {
        Self { plants }
    }

    /// Appends at the end; existing order is never changed.
    pub fn push(&mut self, plant: PlacedPlant) {
        self.plants.push(plant);
    }

    /// Removes the entry with `uuid`. Returns `false` (and changes nothing)
    /// when no entry matches.
    pub fn remove(&mut self, uuid: Uuid) -> bool {
        let before = self.plants.len();
        self.plants.retain(|p| p.uuid != uuid);
        self.plants.len() != before
    }

    /// Returns a copy of this layout without the entry matching `uuid`.
    pub fn without(&self, uuid: Uuid) -> Layout {
        Layout {
            plants: self
                .plants
                .iter()
                .filter(|p| p.uuid != uuid)
                .cloned()
                .collect(),
        }
    }

    /// Replaces the whole sequence, returning the previous one.
    pub fn replace(&mut self, other: Layout) -> Layout {
        std::mem::replace(self, other)
    }

    pub fn clear(&mut self) {
        self.plants.clear();
    }

    pub fn get(&self, uuid: Uuid) -> Option<&PlacedPlant> {
        self.plants.iter().find(|p| p.uuid == uuid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedPlant> {
        self.plants.iter()
    }

    pub fn plants(&self) -> &[PlacedPlant] {
        &self.plants
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// Pairs each entry with its catalog definition, skipping entries whose
    /// `plant_id` no longer resolves.
    pub fn resolved<'a>(
        &'a self,
        catalog: &'a PlantCatalog,
    ) -> impl Iterator<Item = (&'a PlacedPlant, &'a PlantDefinition)> + 'a {
        self.plants
            .iter()
            .filter_map(move |p| catalog.get(&p.plant_id).map(|def| (p, def)))
    }

    /// Number of resolvable instances per plant id.
    pub fn count_by_plant(&self, catalog: &PlantCatalog) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for (placed, _) in self.resolved(catalog) {
            *counts.entry(placed.plant_id.clone()).or_insert(0) += 1;
        }
        counts
    }
}

// =============================================================================
// Events
// =============================================================================

/// Sent after every mutation of the `Layout` resource. The save crate
/// persists the layout cache when it sees one.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChanged {
    Added,
    Removed,
    Replaced,
    Cleared,
}
