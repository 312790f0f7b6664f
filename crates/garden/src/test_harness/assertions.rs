use uuid::Uuid;

use super::TestGarden;
use crate::layout::{Lane, LayoutChanged};

impl TestGarden {
    #[track_caller]
    pub fn assert_layout_len(&self, expected: usize) -> &Self {
        let actual = self.layout().len();
        assert_eq!(actual, expected, "expected {expected} placed plants, got {actual}");
        self
    }

    #[track_caller]
    pub fn assert_placed(&self, uuid: Uuid, x: u32, lane: Lane) -> &Self {
        let Some(plant) = self.layout().get(uuid) else {
            panic!("no placed plant with uuid {uuid}");
        };
        assert_eq!((plant.x, plant.lane), (x, lane), "placement of {uuid}");
        self
    }

    #[track_caller]
    pub fn assert_changes(&self, expected: &[LayoutChanged]) -> &Self {
        assert_eq!(self.recorded_changes(), expected);
        self
    }
}
