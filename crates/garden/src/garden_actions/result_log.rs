//! Ring-buffer log of recently executed garden actions and their results.
//!
//! The [`ActionResultLog`] resource stores the last 64
//! `(GardenAction, ActionResult)` pairs so the session loop can report what
//! happened to the action it just queued.

use bevy::prelude::*;

use super::{ActionResult, GardenAction};

/// Maximum number of entries retained in the ring buffer.
const MAX_ENTRIES: usize = 64;

#[derive(Resource, Debug, Clone, Default)]
pub struct ActionResultLog {
    entries: Vec<(GardenAction, ActionResult)>,
}

impl ActionResultLog {
    /// Record a new action/result pair, evicting the oldest when full.
    pub fn push(&mut self, action: GardenAction, result: ActionResult) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push((action, result));
    }

    /// Return the last `n` entries (or fewer if the log is shorter).
    pub fn last_n(&self, n: usize) -> &[(GardenAction, ActionResult)] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn last_result(&self) -> Option<&ActionResult> {
        self.entries.last().map(|(_, r)| r)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
