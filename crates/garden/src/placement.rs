//! Converts a pointer drop on the bed into a placed plant.
//!
//! Placement is a pure function of the drop point, bed geometry, the plant
//! definition and a read-only view of the existing layout. The only
//! non-deterministic output is the instance uuid.
//!
//! Steps:
//! 1. Offset the pointer by the bed origin.
//! 2. Convert horizontal pixels to whole inches (rounded, clamped at 0, no
//!    upper clamp).
//! 3. Pick the lane from the vertical half of the bed; single-row plants are
//!    always lane 0.
//! 4. Stagger: a bottom-lane drop of a staggering plant that lands within
//!    `spacing_inches` of any top-lane entry shifts right by half the spacing,
//!    once. The shifted position is not re-checked against other neighbors.

use serde::{Deserialize, Serialize};

use crate::config::{BED_HEIGHT_PX, PX_PER_INCH};
use crate::garden_rng::GardenRng;
use crate::layout::{Lane, Layout, PlacedPlant};
use crate::plant_catalog::PlantDefinition;

/// Absolute pointer coordinates at drop time, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropPoint {
    pub x: f64,
    pub y: f64,
}

/// Where the bed sits on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BedGeometry {
    /// Absolute x of the bed's top-left corner.
    pub origin_x: f64,
    /// Absolute y of the bed's top-left corner.
    pub origin_y: f64,
    pub height_px: f64,
}

impl Default for BedGeometry {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            height_px: BED_HEIGHT_PX,
        }
    }
}

impl BedGeometry {
    pub fn at(origin_x: f64, origin_y: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            ..Self::default()
        }
    }
}

/// Position chosen for a drop, before an id is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub lane: Lane,
    /// Whether the stagger offset was applied.
    pub staggered: bool,
}

/// Converts a horizontal pixel offset into whole, non-negative inches.
pub fn pixels_to_inches(rel_x: f64) -> u32 {
    // `as` saturates: negatives and NaN become 0.
    (rel_x / PX_PER_INCH).round() as u32
}

fn lane_for(rel_y: f64, bed: &BedGeometry, def: &PlantDefinition) -> Lane {
    if def.is_single_row() || rel_y < bed.height_px / 2.0 {
        Lane::Top
    } else {
        Lane::Bottom
    }
}

fn has_top_lane_neighbor(existing: &Layout, x: u32, spacing: f64) -> bool {
    existing
        .iter()
        .any(|p| p.lane == Lane::Top && (f64::from(p.x) - f64::from(x)).abs() < spacing)
}

/// Computes the position for a drop without touching the layout.
pub fn compute_placement(
    drop: DropPoint,
    bed: &BedGeometry,
    def: &PlantDefinition,
    existing: &Layout,
) -> Placement {
    let rel_x = drop.x - bed.origin_x;
    let rel_y = drop.y - bed.origin_y;

    let inches_x = pixels_to_inches(rel_x);
    let lane = lane_for(rel_y, bed, def);

    if def.stagger
        && lane == Lane::Bottom
        && has_top_lane_neighbor(existing, inches_x, def.spacing_inches)
    {
        let shifted = (f64::from(inches_x) + def.spacing_inches / 2.0).round() as u32;
        return Placement {
            x: shifted,
            lane,
            staggered: true,
        };
    }

    Placement {
        x: inches_x,
        lane,
        staggered: false,
    }
}

/// Builds the placed-plant record for a drop. The caller appends it.
pub fn place(
    drop: DropPoint,
    bed: &BedGeometry,
    def: &PlantDefinition,
    existing: &Layout,
    rng: &mut GardenRng,
) -> PlacedPlant {
    let placement = compute_placement(drop, bed, def, existing);
    PlacedPlant {
        uuid: rng.next_uuid(),
        plant_id: def.id.clone(),
        x: placement.x,
        lane: placement.lane,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant_catalog::RowCount;
    use uuid::Uuid;

    fn def(id: &str, spacing: f64, rows: RowCount, stagger: bool) -> PlantDefinition {
        PlantDefinition {
            id: id.to_string(),
            name: id.to_string(),
            spacing_inches: spacing,
            row_count: rows,
            stagger,
            color: "#000".to_string(),
            icon: format!("{id}.svg"),
        }
    }

    fn top(x: u32) -> PlacedPlant {
        PlacedPlant {
            uuid: Uuid::from_u128(u128::from(x) + 1000),
            plant_id: "onion".to_string(),
            x,
            lane: Lane::Top,
        }
    }

    /// Drop point that lands at `inches` in the given lane of a bed at (100, 50).
    fn drop_at(inches: f64, lane: Lane) -> DropPoint {
        let y = match lane {
            Lane::Top => 50.0 + 40.0,
            Lane::Bottom => 50.0 + 160.0,
        };
        DropPoint {
            x: 100.0 + inches * PX_PER_INCH,
            y,
        }
    }

    fn bed() -> BedGeometry {
        BedGeometry::at(100.0, 50.0)
    }

    #[test]
    fn test_pixels_round_to_nearest_inch() {
        assert_eq!(pixels_to_inches(0.0), 0);
        assert_eq!(pixels_to_inches(14.0), 1);
        assert_eq!(pixels_to_inches(15.0), 2);
        assert_eq!(pixels_to_inches(123.0), 12);
    }

    #[test]
    fn test_negative_offset_clamps_to_zero() {
        let onion = def("onion", 4.0, RowCount::Double, false);
        let p = compute_placement(
            DropPoint { x: 10.0, y: 60.0 },
            &bed(),
            &onion,
            &Layout::default(),
        );
        assert_eq!(p.x, 0);
        assert_eq!(pixels_to_inches(-1.0e9), 0);
        assert_eq!(pixels_to_inches(f64::NAN), 0);
    }

    #[test]
    fn test_drop_beyond_bed_width_is_not_clamped() {
        let onion = def("onion", 4.0, RowCount::Double, false);
        let p = compute_placement(
            drop_at(500.0, Lane::Top),
            &bed(),
            &onion,
            &Layout::default(),
        );
        assert_eq!(p.x, 500);
    }

    #[test]
    fn test_lane_split_at_half_height() {
        let onion = def("onion", 4.0, RowCount::Double, false);
        let empty = Layout::default();
        let just_above = DropPoint { x: 100.0, y: 50.0 + 99.9 };
        let at_half = DropPoint { x: 100.0, y: 50.0 + 100.0 };
        assert_eq!(compute_placement(just_above, &bed(), &onion, &empty).lane, Lane::Top);
        assert_eq!(compute_placement(at_half, &bed(), &onion, &empty).lane, Lane::Bottom);
    }

    #[test]
    fn test_single_row_forced_to_top_lane() {
        let tomato = def("tomato", 24.0, RowCount::Single, true);
        let layout = Layout::new(vec![top(10)]);
        for y in [-500.0, 0.0, 90.0, 150.0, 199.0, 250.0, 10_000.0] {
            let p = compute_placement(DropPoint { x: 200.0, y }, &bed(), &tomato, &layout);
            assert_eq!(p.lane, Lane::Top, "y = {y}");
            assert!(!p.staggered);
        }
    }

    #[test]
    fn test_stagger_applies_within_spacing() {
        let lettuce = def("lettuce", 12.0, RowCount::Double, true);
        let layout = Layout::new(vec![top(10)]);

        let near = compute_placement(drop_at(15.0, Lane::Bottom), &bed(), &lettuce, &layout);
        assert_eq!(near.lane, Lane::Bottom);
        assert_eq!(near.x, 21);
        assert!(near.staggered);

        let far = compute_placement(drop_at(30.0, Lane::Bottom), &bed(), &lettuce, &layout);
        assert_eq!(far.x, 30);
        assert!(!far.staggered);
    }

    #[test]
    fn test_stagger_threshold_is_strict() {
        let lettuce = def("lettuce", 12.0, RowCount::Double, true);
        let layout = Layout::new(vec![top(10)]);
        let boundary = compute_placement(drop_at(22.0, Lane::Bottom), &bed(), &lettuce, &layout);
        assert_eq!(boundary.x, 22);
        assert!(!boundary.staggered);
    }

    #[test]
    fn test_stagger_ignores_bottom_lane_neighbors() {
        let lettuce = def("lettuce", 12.0, RowCount::Double, true);
        let mut neighbor = top(10);
        neighbor.lane = Lane::Bottom;
        let layout = Layout::new(vec![neighbor]);
        let p = compute_placement(drop_at(15.0, Lane::Bottom), &bed(), &lettuce, &layout);
        assert_eq!(p.x, 15);
    }

    #[test]
    fn test_stagger_not_applied_in_top_lane_or_without_flag() {
        let layout = Layout::new(vec![top(10)]);
        let staggering = def("lettuce", 12.0, RowCount::Double, true);
        let plain = def("beet", 12.0, RowCount::Double, false);

        let in_top = compute_placement(drop_at(15.0, Lane::Top), &bed(), &staggering, &layout);
        assert_eq!(in_top.x, 15);

        let no_flag = compute_placement(drop_at(15.0, Lane::Bottom), &bed(), &plain, &layout);
        assert_eq!(no_flag.x, 15);
    }

    #[test]
    fn test_stagger_offset_applied_once() {
        // Shifted position 21 sits right on top of another neighbor at 21;
        // the offset is still applied only once.
        let lettuce = def("lettuce", 12.0, RowCount::Double, true);
        let layout = Layout::new(vec![top(10), top(21)]);
        let p = compute_placement(drop_at(15.0, Lane::Bottom), &bed(), &lettuce, &layout);
        assert_eq!(p.x, 21);
    }

    #[test]
    fn test_odd_spacing_half_offset_rounds() {
        let radish = def("radish", 5.0, RowCount::Double, true);
        let layout = Layout::new(vec![top(10)]);
        let p = compute_placement(drop_at(10.0, Lane::Bottom), &bed(), &radish, &layout);
        // 10 + 2.5 rounds half away from zero.
        assert_eq!(p.x, 13);
    }

    #[test]
    fn test_empty_layout_never_staggers() {
        let lettuce = def("lettuce", 12.0, RowCount::Double, true);
        let p = compute_placement(
            drop_at(15.0, Lane::Bottom),
            &bed(),
            &lettuce,
            &Layout::default(),
        );
        assert_eq!(p.x, 15);
        assert!(!p.staggered);
    }

    #[test]
    fn test_place_is_deterministic_except_uuid() {
        let lettuce = def("lettuce", 12.0, RowCount::Double, true);
        let layout = Layout::new(vec![top(10)]);
        let snapshot = layout.clone();
        let mut rng = GardenRng::default();

        let a = place(drop_at(15.0, Lane::Bottom), &bed(), &lettuce, &layout, &mut rng);
        let b = place(drop_at(15.0, Lane::Bottom), &bed(), &lettuce, &layout, &mut rng);

        assert_eq!((a.x, a.lane), (b.x, b.lane));
        assert_ne!(a.uuid, b.uuid);
        assert_eq!(a.plant_id, "lettuce");
        assert_eq!(layout, snapshot, "placement must not mutate the layout");
    }

    #[test]
    fn test_non_negative_over_many_drops() {
        let onion = def("onion", 4.0, RowCount::Double, true);
        let layout = Layout::new(vec![top(0), top(3)]);
        let mut px = -2000.0;
        while px < 2000.0 {
            let p = compute_placement(DropPoint { x: px, y: px }, &bed(), &onion, &layout);
            let again = compute_placement(DropPoint { x: px, y: px }, &bed(), &onion, &layout);
            assert_eq!(p, again);
            assert!(p.x < 1000, "x out of expected range at px = {px}");
            px += 37.5;
        }
    }
}
