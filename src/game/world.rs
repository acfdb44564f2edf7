//! # World
//!
//! The installed level: walkable tiles, walls, doors, stairway, monsters and
//! loose items. A fresh `World` is built from a generator's `LevelLayout`
//! every time the level is (re)generated.

use crate::generation::{spawn_monster, LootTable};
use crate::{Creature, GameError, GameResult, Item, Monster, Position, Species};
use log::warn;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which kind of wall a door sits in, derived from its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorOrientation {
    /// Both horizontal neighbours are walkable, so the door pierces a vertical wall.
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub position: Position,
    pub open: bool,
    pub orientation: DoorOrientation,
}

/// A monster to create at a position, as handed over by a level generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterPlacement {
    pub species: Species,
    pub position: Position,
}

/// Raw level description produced by a `LevelGenerator`.
///
/// Door and stairway positions are also members of `floor`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub floor: HashSet<Position>,
    pub walls: HashSet<Position>,
    pub doors: Vec<Position>,
    pub stairs: Position,
    pub player_start: Position,
    pub monsters: Vec<MonsterPlacement>,
}

impl LevelLayout {
    /// Checks that every special tile sits on the floor and nothing overlaps.
    pub fn validate(&self) -> GameResult<()> {
        if self.floor.is_empty() {
            return Err(GameError::InvalidLevel("layout has no floor tiles".to_string()));
        }
        if !self.floor.contains(&self.stairs) {
            return Err(GameError::InvalidLevel(format!(
                "stairway {} is not on the floor",
                self.stairs
            )));
        }
        if !self.floor.contains(&self.player_start) {
            return Err(GameError::InvalidLevel(format!(
                "player start {} is not on the floor",
                self.player_start
            )));
        }
        if self.player_start == self.stairs {
            return Err(GameError::InvalidLevel(
                "player start coincides with the stairway".to_string(),
            ));
        }
        if let Some(wall) = self.walls.iter().find(|wall| self.floor.contains(wall)) {
            return Err(GameError::InvalidLevel(format!("{} is both wall and floor", wall)));
        }
        for door in &self.doors {
            if !self.floor.contains(door) {
                return Err(GameError::InvalidLevel(format!("door {} is not on the floor", door)));
            }
        }

        let mut occupied = HashSet::from([self.player_start]);
        for placement in &self.monsters {
            if !self.floor.contains(&placement.position) {
                return Err(GameError::InvalidLevel(format!(
                    "{} placed off the floor at {}",
                    placement.species.name(),
                    placement.position
                )));
            }
            if !occupied.insert(placement.position) {
                return Err(GameError::InvalidLevel(format!(
                    "{} is occupied twice",
                    placement.position
                )));
            }
        }
        Ok(())
    }
}

/// The current level with everything living on it.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub depth: u32,
    pub floor: HashSet<Position>,
    pub walls: HashSet<Position>,
    pub doors: HashMap<Position, Door>,
    pub stairs: Position,
    pub player_start: Position,
    pub monsters: Vec<Monster>,
    pub ground_items: HashMap<Position, Vec<Item>>,
}

impl World {
    /// Validates a layout and installs it, creating monsters through the loot table.
    pub fn install(
        layout: LevelLayout,
        depth: u32,
        loot: &dyn LootTable,
        rng: &mut StdRng,
    ) -> GameResult<Self> {
        layout.validate()?;

        let doors = layout
            .doors
            .iter()
            .map(|&position| {
                let vertical = layout.floor.contains(&position.offset(1, 0))
                    && layout.floor.contains(&position.offset(-1, 0));
                let orientation = if vertical {
                    DoorOrientation::Vertical
                } else {
                    DoorOrientation::Horizontal
                };
                (
                    position,
                    Door {
                        position,
                        open: false,
                        orientation,
                    },
                )
            })
            .collect();

        let monsters = layout
            .monsters
            .iter()
            .map(|placement| spawn_monster(placement.species, placement.position, depth, loot, rng))
            .collect();

        Ok(Self {
            depth,
            floor: layout.floor,
            walls: layout.walls,
            doors,
            stairs: layout.stairs,
            player_start: layout.player_start,
            monsters,
            ground_items: HashMap::new(),
        })
    }

    /// True when the position is a known walkable tile (doors and stairway included).
    pub fn is_walkable(&self, position: Position) -> bool {
        self.floor.contains(&position)
    }

    pub fn is_wall(&self, position: Position) -> bool {
        self.walls.contains(&position)
    }

    pub fn is_closed_door(&self, position: Position) -> bool {
        self.doors.get(&position).is_some_and(|door| !door.open)
    }

    pub fn closed_doors(&self) -> impl Iterator<Item = &Door> {
        self.doors.values().filter(|door| !door.open)
    }

    /// Opens a closed door. Returns the door when its state changed.
    ///
    /// Doors never close again once opened.
    pub fn open_door(&mut self, position: Position) -> Option<&Door> {
        match self.doors.get_mut(&position) {
            Some(door) if !door.open => {
                door.open = true;
                Some(door)
            }
            _ => None,
        }
    }

    pub fn monster_at(&self, position: Position) -> Option<&Monster> {
        self.monsters
            .iter()
            .find(|monster| monster.is_alive() && monster.position == position)
    }

    /// Index of the live monster standing on `position`, ignoring corpses.
    pub fn live_monster_index_at(&self, position: Position) -> Option<usize> {
        self.monsters
            .iter()
            .position(|monster| monster.is_alive() && monster.position == position)
    }

    pub fn live_monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(|monster| monster.is_alive())
    }

    /// Whether a monster may step onto `position` this turn.
    pub fn is_available_for_monster(&self, position: Position, player_position: Position) -> bool {
        self.is_walkable(position)
            && !self.is_closed_door(position)
            && position != player_position
            && self.monster_at(position).is_none()
    }

    pub fn drop_item(&mut self, position: Position, item: Item) {
        self.ground_items.entry(position).or_default().push(item);
    }

    /// Removes and returns everything lying on `position`.
    pub fn take_items(&mut self, position: Position) -> Vec<Item> {
        self.ground_items.remove(&position).unwrap_or_default()
    }

    /// Checks the per-entity invariants of every monster.
    pub fn check_invariants(&self) -> GameResult<()> {
        for monster in &self.monsters {
            let stats = &monster.stats;
            if stats.hp < 0 || stats.hp > stats.max_hp {
                return Err(GameError::InvariantViolation(format!(
                    "{} hp {} outside [0, {}]",
                    monster.name, stats.hp, stats.max_hp
                )));
            }
            if monster.dead != (stats.hp == 0) {
                return Err(GameError::InvariantViolation(format!(
                    "{} dead flag {} with hp {}",
                    monster.name, monster.dead, stats.hp
                )));
            }
            if !self.is_walkable(monster.position) {
                warn!("{} stands off the floor at {}", monster.name, monster.position);
                return Err(GameError::InvariantViolation(format!(
                    "{} off the floor at {}",
                    monster.name, monster.position
                )));
            }
        }
        Ok(())
    }
}
