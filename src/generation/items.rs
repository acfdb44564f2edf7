//! # Item Generation
//!
//! Starting equipment and the depth-gated drop table monsters roll against
//! when they are created.

use crate::{Item, LootTable};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Armor every new character starts in.
pub fn starting_armor() -> Item {
    Item::armor("Wood Armor", 1)
}

/// Weapon every new character starts with.
pub fn starting_weapon() -> Item {
    Item::weapon("Stone Spear", 1)
}

/// One row of the drop catalog.
#[derive(Debug, Clone)]
pub struct LootEntry {
    /// Shallowest depth the item can drop at
    pub min_depth: u32,
    pub item: Item,
}

/// Drops one item with probability `1 / drop_chance`, drawn uniformly from
/// the catalog entries unlocked at the current depth.
#[derive(Debug, Clone)]
pub struct StandardLoot {
    pub catalog: Vec<LootEntry>,
}

impl StandardLoot {
    pub fn new() -> Self {
        let entry = |min_depth, item| LootEntry { min_depth, item };
        Self {
            catalog: vec![
                entry(1, Item::potion("Healing Potion", 10)),
                entry(1, Item::weapon("Stone Spear", 1)),
                entry(1, Item::armor("Wood Armor", 1)),
                entry(3, Item::weapon("Iron Sword", 3)),
                entry(4, Item::armor("Chain Mail", 3)),
            ],
        }
    }

    /// Catalog items available at `depth`.
    pub fn available(&self, depth: u32) -> Vec<&Item> {
        self.catalog
            .iter()
            .filter(|entry| entry.min_depth <= depth)
            .map(|entry| &entry.item)
            .collect()
    }
}

impl Default for StandardLoot {
    fn default() -> Self {
        Self::new()
    }
}

impl LootTable for StandardLoot {
    fn spawn_drop(
        &self,
        monster_name: &str,
        drop_chance: u32,
        depth: u32,
        rng: &mut StdRng,
    ) -> Option<Item> {
        if drop_chance == 0 || rng.gen_range(0..drop_chance) != 0 {
            return None;
        }
        let item = self.available(depth).choose(rng).map(|item| (*item).clone())?;
        debug!("{} at depth {} carries {}", monster_name, depth, item.name);
        Some(item)
    }
}
