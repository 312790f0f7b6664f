//! Action executor system: drains the [`ActionQueue`] each update, applies
//! every queued [`GardenAction`] to the layout, and records results in the
//! [`ActionResultLog`].
//!
//! Each action either applies fully or leaves the layout untouched. A
//! [`LayoutChanged`] event follows every mutation so the cache can be
//! rewritten.

use bevy::prelude::*;

use crate::garden_rng::GardenRng;
use crate::layout::{Layout, LayoutChanged};
use crate::layout_io::apply_import;
use crate::notifications::NotificationEvent;
use crate::placement::place;
use crate::plant_catalog::PlantCatalog;

use super::result_log::ActionResultLog;
use super::{ActionError, ActionQueue, ActionResult, GardenAction};

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Drains all pending actions from the queue and executes them in order.
pub fn execute_queued_actions(
    mut queue: ResMut<ActionQueue>,
    mut log: ResMut<ActionResultLog>,
    mut layout: ResMut<Layout>,
    catalog: Res<PlantCatalog>,
    mut rng: ResMut<GardenRng>,
    mut changed: EventWriter<LayoutChanged>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for action in queue.drain() {
        let (result, change) = execute_action(&action, &mut layout, &catalog, &mut rng);
        if let Some(change) = change {
            changed.send(change);
        }
        if let ActionResult::Error(err) = &result {
            warn!("Garden action rejected: {err}");
            notifications.send(NotificationEvent::error(err.to_string()));
        }
        log.push(action, result);
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Applies one action. Returns the result plus the change to announce, if
/// the layout was mutated.
pub fn execute_action(
    action: &GardenAction,
    layout: &mut Layout,
    catalog: &PlantCatalog,
    rng: &mut GardenRng,
) -> (ActionResult, Option<LayoutChanged>) {
    match action {
        GardenAction::DropPlant {
            plant_id,
            drop,
            bed,
        } => {
            let Some(def) = catalog.get(plant_id) else {
                return (
                    ActionResult::Error(ActionError::UnknownPlant(plant_id.clone())),
                    None,
                );
            };
            let placed = place(*drop, bed, def, layout, rng);
            debug!(
                "Placed {} ({}) at x={} lane={:?}",
                placed.plant_id, placed.uuid, placed.x, placed.lane
            );
            layout.push(placed.clone());
            (ActionResult::Placed(placed), Some(LayoutChanged::Added))
        }
        GardenAction::RemovePlant { uuid } => {
            if layout.remove(*uuid) {
                debug!("Removed {uuid}");
                (ActionResult::Success, Some(LayoutChanged::Removed))
            } else {
                (ActionResult::Success, None)
            }
        }
        GardenAction::ImportLayout { json } => match apply_import(layout, json) {
            Ok(count) => {
                info!("Imported layout with {count} plants");
                (
                    ActionResult::Imported { count },
                    Some(LayoutChanged::Replaced),
                )
            }
            Err(e) => (ActionResult::Error(e.into()), None),
        },
        GardenAction::ClearLayout => {
            layout.clear();
            (ActionResult::Success, Some(LayoutChanged::Cleared))
        }
    }
}
