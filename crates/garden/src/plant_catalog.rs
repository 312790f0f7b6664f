//! Plant definitions and the session catalog.
//!
//! The catalog is append-only for the lifetime of a session: definitions are
//! loaded once at startup and new ones may be added, but none are removed or
//! mutated. Ids are unique across the catalog.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Row count
// =============================================================================

/// Number of lanes a plant occupies. Serialized as the integer 1 or 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RowCount {
    /// Every instance sits in a single centered lane.
    Single,
    /// Instances are placed in the top or bottom lane by drop position.
    Double,
}

impl TryFrom<u8> for RowCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(RowCount::Single),
            2 => Ok(RowCount::Double),
            other => Err(format!("rowCount must be 1 or 2, got {other}")),
        }
    }
}

impl From<RowCount> for u8 {
    fn from(rows: RowCount) -> Self {
        match rows {
            RowCount::Single => 1,
            RowCount::Double => 2,
        }
    }
}

// =============================================================================
// Plant definition
// =============================================================================

/// An immutable catalog entry describing one kind of plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantDefinition {
    /// Unique lowercase identifier.
    pub id: String,
    pub name: String,
    /// Visual diameter and minimum neighbor distance for staggering.
    pub spacing_inches: f64,
    pub row_count: RowCount,
    /// Offset bottom-lane placements away from top-lane neighbors.
    pub stagger: bool,
    /// Presentation only.
    pub color: String,
    /// Presentation only.
    pub icon: String,
}

impl PlantDefinition {
    /// Checks the field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::InvalidDefinition {
                id: self.id.clone(),
                reason: "id must not be empty".to_string(),
            });
        }
        if self.id != self.id.to_lowercase() {
            return Err(CatalogError::InvalidDefinition {
                id: self.id.clone(),
                reason: "id must be lowercase".to_string(),
            });
        }
        if !self.spacing_inches.is_finite() || self.spacing_inches <= 0.0 {
            return Err(CatalogError::InvalidDefinition {
                id: self.id.clone(),
                reason: format!(
                    "spacingInches must be a positive number, got {}",
                    self.spacing_inches
                ),
            });
        }
        Ok(())
    }

    pub fn is_single_row(&self) -> bool {
        self.row_count == RowCount::Single
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors raised when building or extending a catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog document is not a JSON array of plant definitions.
    Parse(String),
    /// A definition with this id already exists.
    DuplicateId(String),
    /// A definition violates a field constraint.
    InvalidDefinition { id: String, reason: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Parse(msg) => write!(f, "Catalog parse error: {msg}"),
            CatalogError::DuplicateId(id) => write!(f, "Plant id '{id}' already exists"),
            CatalogError::InvalidDefinition { id, reason } => {
                write!(f, "Invalid plant definition '{id}': {reason}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

// =============================================================================
// Catalog resource
// =============================================================================

/// Ordered sequence of available plant definitions.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantCatalog {
    definitions: Vec<PlantDefinition>,
}

impl PlantCatalog {
    /// Builds a catalog, validating every definition and id uniqueness.
    pub fn from_definitions(definitions: Vec<PlantDefinition>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for def in definitions {
            catalog.insert(def)?;
        }
        Ok(catalog)
    }

    /// Parses a JSON array of plant definitions.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<PlantDefinition> =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_definitions(definitions)
    }

    /// Parses a JSON array of plant definitions, skipping entries that do not
    /// decode, fail validation, or repeat an earlier id. Only a document that
    /// is not an array at all is an error.
    pub fn from_json_lenient(text: &str) -> Result<(Self, Vec<CatalogError>), CatalogError> {
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut catalog = Self::default();
        let mut skipped = Vec::new();
        for entry in entries {
            let id = entry
                .get("id")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("?")
                .to_string();
            let inserted = serde_json::from_value::<PlantDefinition>(entry)
                .map_err(|e| CatalogError::InvalidDefinition {
                    id,
                    reason: e.to_string(),
                })
                .and_then(|def| catalog.insert(def));
            if let Err(e) = inserted {
                skipped.push(e);
            }
        }
        Ok((catalog, skipped))
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.definitions)
    }

    /// Appends a definition. Existing entries are never replaced.
    pub fn insert(&mut self, def: PlantDefinition) -> Result<(), CatalogError> {
        def.validate()?;
        if self.contains(&def.id) {
            return Err(CatalogError::DuplicateId(def.id));
        }
        self.definitions.push(def);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PlantDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantDefinition> {
        self.definitions.iter()
    }

    pub fn definitions(&self) -> &[PlantDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
