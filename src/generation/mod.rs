//! # Generation Module
//!
//! Seams for the content collaborators the simulation consumes: level layouts
//! and loot. Layout generation algorithms are not part of the simulation; the
//! `AsciiLevels` generator here replays hand-drawn maps, which is what tests
//! and the headless binary use.

pub mod ascii;
pub mod encounters;
pub mod items;

pub use ascii::*;
pub use encounters::*;
pub use items::*;

use crate::{GameResult, Item, LevelLayout};
use rand::rngs::StdRng;

/// Produces the layout of a level for a given depth.
///
/// Invoked once at game start and once per depth transition.
pub trait LevelGenerator {
    /// Generates the layout for `depth` using the session's random number generator.
    fn generate(&self, depth: u32, rng: &mut StdRng) -> GameResult<LevelLayout>;

    /// Validates that the generated layout can be installed.
    fn validate(&self, layout: &LevelLayout) -> GameResult<()> {
        layout.validate()
    }

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Decides what, if anything, a freshly created monster carries.
pub trait LootTable {
    fn spawn_drop(
        &self,
        monster_name: &str,
        drop_chance: u32,
        depth: u32,
        rng: &mut StdRng,
    ) -> Option<Item>;
}

/// Loot table that never drops anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoot;

impl LootTable for NoLoot {
    fn spawn_drop(&self, _: &str, _: u32, _: u32, _: &mut StdRng) -> Option<Item> {
        None
    }
}
