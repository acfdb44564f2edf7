//! # Entities
//!
//! Plain data records for the player, monsters and items, plus the `Creature`
//! trait that lets combat treat both sides of a fight uniformly.

use crate::config::{
    INVENTORY_CAPACITY, LEVEL_UP_DEFENSE, LEVEL_UP_MAX_HP, LEVEL_UP_STRENGTH, LEVEL_UP_THRESHOLD,
};
use crate::{new_entity_id, EntityId, Position};
use serde::{Deserialize, Serialize};

/// Combat statistics shared by every creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: i32,
    pub max_hp: i32,
    pub strength: i32,
    pub defense: i32,
    /// Critical chance on a 0..10 scale
    pub crit: f64,
    /// Sight radius in tiles
    pub vision: u32,
}

impl Stats {
    /// Creates stats at full health. Negative hit points are clamped to zero.
    pub fn new(hp: i32, strength: i32, defense: i32, crit: f64, vision: u32) -> Self {
        let hp = hp.max(0);
        Self {
            hp,
            max_hp: hp,
            strength,
            defense,
            crit,
            vision,
        }
    }
}

/// Special behaviour a species triggers around critical hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnCrit {
    None,
    /// Landing a critical hit poisons the defender for the given number of turns.
    ApplyPoison { turns: u32 },
    /// Receiving a critical hit from the player kills outright.
    InstantKillIfCrit,
}

/// Opaque visual reference handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRef {
    pub sheet: String,
    pub frame: u32,
}

/// Monster kinds known to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Snake,
    Skeleton,
    Fairy,
}

/// Base values a species is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesProfile {
    pub name: &'static str,
    pub hp: i32,
    pub strength: i32,
    pub defense: i32,
    pub crit: f64,
    pub vision: u32,
    pub exp_reward: i32,
    pub sheet: &'static str,
    pub frame: u32,
    /// One in `drop_chance` monsters carries an item
    pub drop_chance: u32,
}

impl Species {
    pub fn profile(self) -> SpeciesProfile {
        match self {
            Species::Snake => SpeciesProfile {
                name: "Snake",
                hp: 10,
                strength: 3,
                defense: 1,
                crit: 3.0,
                vision: 3,
                exp_reward: 10,
                sheet: "reptile0",
                frame: 43,
                drop_chance: 5,
            },
            Species::Skeleton => SpeciesProfile {
                name: "Skeleton",
                hp: 15,
                strength: 4,
                defense: 2,
                crit: 2.0,
                vision: 4,
                exp_reward: 10,
                sheet: "undead0",
                frame: 24,
                drop_chance: 20,
            },
            Species::Fairy => SpeciesProfile {
                name: "Fairy",
                hp: 20,
                strength: 2,
                defense: 0,
                crit: 3.0,
                vision: 5,
                exp_reward: 10,
                sheet: "humanoid0",
                frame: 34,
                drop_chance: 3,
            },
        }
    }

    pub fn on_crit(self) -> OnCrit {
        match self {
            Species::Snake => OnCrit::ApplyPoison {
                turns: crate::config::POISON_TURNS,
            },
            Species::Skeleton => OnCrit::InstantKillIfCrit,
            Species::Fairy => OnCrit::None,
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    /// Map glyph used by ASCII level sets.
    pub fn glyph(self) -> char {
        match self {
            Species::Snake => 's',
            Species::Skeleton => 'k',
            Species::Fairy => 'f',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Species> {
        match glyph {
            's' => Some(Species::Snake),
            'k' => Some(Species::Skeleton),
            'f' => Some(Species::Fairy),
            _ => None,
        }
    }
}

/// What an item does when carried or equipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon { strength: i32 },
    Armor { defense: i32 },
    Potion { heal: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn weapon(name: &str, strength: i32) -> Self {
        Self {
            name: name.to_string(),
            kind: ItemKind::Weapon { strength },
        }
    }

    pub fn armor(name: &str, defense: i32) -> Self {
        Self {
            name: name.to_string(),
            kind: ItemKind::Armor { defense },
        }
    }

    pub fn potion(name: &str, heal: i32) -> Self {
        Self {
            name: name.to_string(),
            kind: ItemKind::Potion { heal },
        }
    }

    /// Strength added when wielded; zero for anything that is not a weapon.
    pub fn strength_bonus(&self) -> i32 {
        match self.kind {
            ItemKind::Weapon { strength } => strength,
            _ => 0,
        }
    }

    /// Defense added when worn; zero for anything that is not armor.
    pub fn defense_bonus(&self) -> i32 {
        match self.kind {
            ItemKind::Armor { defense } => defense,
            _ => 0,
        }
    }
}

/// Result of trying to store an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pickup {
    Stored(usize),
    /// No free slot; the item is handed back to the caller.
    Full(Item),
}

/// Fixed-capacity ordered slots, each empty or holding one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Option<Item>>,
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            slots: vec![None; INVENTORY_CAPACITY],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<Item>] {
        &self.slots
    }

    /// Index of the first empty slot.
    pub fn free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn pickup(&mut self, item: Item) -> Pickup {
        match self.free_slot() {
            Some(index) => {
                self.slots[index] = Some(item);
                Pickup::Stored(index)
            }
            None => Pickup::Full(item),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// Player archetypes; only the sprite sheet depends on it for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerClass {
    Warrior,
    Engineer,
    Mage,
    Paladin,
    Rogue,
}

impl PlayerClass {
    pub fn all() -> [PlayerClass; 5] {
        [
            PlayerClass::Warrior,
            PlayerClass::Engineer,
            PlayerClass::Mage,
            PlayerClass::Paladin,
            PlayerClass::Rogue,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoisonStatus {
    pub active: bool,
    pub turns_left: u32,
}

/// Emitted when accumulated experience crosses the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub new_level: u32,
    pub strength_gain: i32,
    pub defense_gain: i32,
    pub max_hp_gain: i32,
}

/// Experience awarded for a kill. `gained` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceGain {
    pub gained: i32,
    pub level_up: Option<LevelUp>,
}

/// Anything that can attack or be attacked.
///
/// Implementors only expose their data; the hp/dead invariant is maintained by
/// the provided [`Creature::set_hp`], which every damage path goes through.
pub trait Creature {
    fn id(&self) -> EntityId;
    fn name(&self) -> &str;
    fn stats(&self) -> &Stats;
    fn stats_mut(&mut self) -> &mut Stats;
    fn position(&self) -> Position;
    fn is_dead(&self) -> bool;
    fn set_dead(&mut self, dead: bool);

    fn is_player(&self) -> bool {
        false
    }

    fn on_crit(&self) -> OnCrit {
        OnCrit::None
    }

    /// Strength added by an equipped weapon.
    fn weapon_bonus(&self) -> i32 {
        0
    }

    /// Defense added by equipped armor.
    fn armor_bonus(&self) -> i32 {
        0
    }

    /// Experience value of killing this creature.
    fn experience_reward(&self) -> i32 {
        0
    }

    /// Returns true when the creature can be and now is poisoned.
    fn poison(&mut self, _turns: u32) -> bool {
        false
    }

    /// Credits a kill worth `reward`; only creatures that level up return a gain.
    fn award_kill(&mut self, _reward: i32) -> Option<ExperienceGain> {
        None
    }

    fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Sets hit points clamped to `[0, max_hp]` and syncs the dead flag.
    fn set_hp(&mut self, hp: i32) {
        let stats = self.stats_mut();
        stats.hp = hp.clamp(0, stats.max_hp.max(0));
        let dead = stats.hp == 0;
        self.set_dead(dead);
    }

    /// Subtracts `amount` (negative heals) and returns the hit points actually lost.
    fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.stats().hp;
        self.set_hp(before.saturating_sub(amount));
        before - self.stats().hp
    }
}

/// The player character. Created once per game and carried across depths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub name: String,
    pub class: PlayerClass,
    pub level: u32,
    pub experience: i32,
    pub stats: Stats,
    pub mp: i32,
    pub max_mp: i32,
    pub poison: PoisonStatus,
    pub dead: bool,
    pub inventory: Inventory,
    pub armor: Item,
    pub weapon: Item,
    pub position: Position,
    /// Set while a step's input delay is running; gates further movement.
    pub moving: bool,
}

impl Player {
    pub fn new(
        name: String,
        class: PlayerClass,
        stats: Stats,
        mp: i32,
        armor: Item,
        weapon: Item,
        position: Position,
    ) -> Self {
        let mp = mp.max(0);
        let dead = stats.hp == 0;
        Self {
            id: new_entity_id(),
            name,
            class,
            level: 1,
            experience: 0,
            stats,
            mp,
            max_mp: mp,
            poison: PoisonStatus::default(),
            dead,
            inventory: Inventory::new(),
            armor,
            weapon,
            position,
            moving: false,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poison.active
    }

    pub fn pickup(&mut self, item: Item) -> Pickup {
        self.inventory.pickup(item)
    }

    fn level_up(&mut self) -> LevelUp {
        self.experience -= LEVEL_UP_THRESHOLD;
        self.level += 1;
        self.stats.strength += LEVEL_UP_STRENGTH;
        self.stats.defense += LEVEL_UP_DEFENSE;
        self.stats.max_hp += LEVEL_UP_MAX_HP;
        LevelUp {
            new_level: self.level,
            strength_gain: LEVEL_UP_STRENGTH,
            defense_gain: LEVEL_UP_DEFENSE,
            max_hp_gain: LEVEL_UP_MAX_HP,
        }
    }
}

impl Creature for Player {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    fn is_player(&self) -> bool {
        true
    }

    fn weapon_bonus(&self) -> i32 {
        self.weapon.strength_bonus()
    }

    fn armor_bonus(&self) -> i32 {
        self.armor.defense_bonus()
    }

    fn poison(&mut self, turns: u32) -> bool {
        self.poison = PoisonStatus {
            active: true,
            turns_left: turns,
        };
        true
    }

    fn award_kill(&mut self, reward: i32) -> Option<ExperienceGain> {
        let gained = reward - self.level as i32 * 2;
        self.experience += gained;
        let level_up = (self.experience >= LEVEL_UP_THRESHOLD).then(|| self.level_up());
        Some(ExperienceGain { gained, level_up })
    }
}

/// A monster on the current level. Discarded when the level is regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub species: Species,
    pub name: String,
    pub stats: Stats,
    pub exp_reward: i32,
    pub sprite: SpriteRef,
    pub drop_chance: u32,
    pub dropped_item: Option<Item>,
    pub position: Position,
    pub dead: bool,
}

impl Monster {
    /// Creates a monster at full health from its species profile.
    pub fn new(species: Species, position: Position, dropped_item: Option<Item>) -> Self {
        let profile = species.profile();
        Self {
            id: new_entity_id(),
            species,
            name: profile.name.to_string(),
            stats: Stats::new(
                profile.hp,
                profile.strength,
                profile.defense,
                profile.crit,
                profile.vision,
            ),
            exp_reward: profile.exp_reward,
            sprite: SpriteRef {
                sheet: profile.sheet.to_string(),
                frame: profile.frame,
            },
            drop_chance: profile.drop_chance,
            dropped_item,
            position,
            dead: false,
        }
    }
}

impl Creature for Monster {
    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut Stats {
        &mut self.stats
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn set_dead(&mut self, dead: bool) {
        self.dead = dead;
    }

    fn on_crit(&self) -> OnCrit {
        self.species.on_crit()
    }

    fn experience_reward(&self) -> i32 {
        self.exp_reward
    }
}
