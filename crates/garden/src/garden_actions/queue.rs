use bevy::prelude::*;

use super::GardenAction;

/// FIFO of actions waiting for the executor.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ActionQueue {
    pending: Vec<GardenAction>,
}

impl ActionQueue {
    pub fn push(&mut self, action: GardenAction) {
        self.pending.push(action);
    }

    pub fn drain(&mut self) -> Vec<GardenAction> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
