//! Instance id generation.
//!
//! Wraps `ChaCha8Rng` so that placement ids are reproducible under a fixed
//! seed in tests, while the binary reseeds from OS entropy at startup.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// Default seed used when no explicit seed is provided.
const DEFAULT_SEED: u64 = 42;

/// RNG resource backing `PlacedPlant` uuids.
#[derive(Resource)]
pub struct GardenRng(pub ChaCha8Rng);

impl Default for GardenRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl GardenRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// Draws a fresh random (version 4) uuid.
    pub fn next_uuid(&mut self) -> Uuid {
        let bytes: [u8; 16] = self.0.gen();
        uuid::Builder::from_random_bytes(bytes).into_uuid()
    }
}
