use rand::Rng;
use rand::seq::IndexedRandom as _;

use super::{Board, Tile};

/// Chance that a spawned tile is a 4 rather than a 2.
pub const FOUR_PROBABILITY: f64 = 0.1;

pub fn random_tile_value<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.random_bool(FOUR_PROBABILITY) { 4 } else { 2 }
}

impl Board {
    /// Places a 2 (90%) or 4 (10%) on an empty cell chosen uniformly at random.
    ///
    /// A full board is returned unchanged.
    pub fn with_random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let Some(&pos) = self.empty_cells().choose(rng) else {
            log::debug!("no empty cell to spawn into");
            return self.clone();
        };

        let value = random_tile_value(rng);
        log::debug!("spawned {value} at {pos:?}");

        self.with_tile(pos, value)
    }
}
