use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::placement::{BedGeometry, DropPoint};

/// A user intent against the layout, queued by the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum GardenAction {
    /// A catalog plant was dropped onto the bed.
    DropPlant {
        plant_id: String,
        drop: DropPoint,
        #[serde(default)]
        bed: BedGeometry,
    },
    /// A placed plant was clicked for removal.
    RemovePlant {
        uuid: Uuid,
    },
    /// Replace the whole layout with an exported document.
    ImportLayout {
        json: String,
    },
    ClearLayout,
}
