//! # Encounter Generation
//!
//! Creature pools per dungeon area and monster creation with loot attached.

use crate::{LootTable, Monster, Position, Species};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Creatures found in the first area of the dungeon.
pub const AREA_ONE_POOL: [Species; 3] = [Species::Skeleton, Species::Snake, Species::Fairy];

/// Pool of creatures that can appear at `depth`.
///
/// Only the first area has a pool so far; deeper levels reuse it.
pub fn species_pool(_depth: u32) -> &'static [Species] {
    &AREA_ONE_POOL
}

/// Picks a random creature suited to `depth`.
pub fn pick_species(depth: u32, rng: &mut StdRng) -> Species {
    species_pool(depth)
        .choose(rng)
        .copied()
        .unwrap_or(Species::Snake)
}

/// Creates a monster and rolls its carried item against the loot table.
pub fn spawn_monster(
    species: Species,
    position: Position,
    depth: u32,
    loot: &dyn LootTable,
    rng: &mut StdRng,
) -> Monster {
    let profile = species.profile();
    let dropped_item = loot.spawn_drop(profile.name, profile.drop_chance, depth, rng);
    Monster::new(species, position, dropped_item)
}
