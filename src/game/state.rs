//! # Game State Module
//!
//! The session owning the single world snapshot, plus the configuration it is
//! built from and the event stream it reports to renderer and audio
//! collaborators.
//!
//! A player step is split in two halves. [`Session::attempt_player_step`]
//! resolves the player's action and leaves the player `moving`; once the
//! input delay has elapsed [`Session::finish_step`] clears the flag and runs
//! exactly one monster turn. [`Session::step`] does both at once.

use crate::config::{INPUT_DELAY_MS, INVENTORY_CAPACITY, MUSIC_SWITCH_DEPTH, STARTING_DEPTH};
use crate::generation::{starting_armor, starting_weapon, LevelGenerator, LootTable};
use crate::{
    run_turn, Creature, DoorOrientation, EntityId, GameError, GameResult, Player, PlayerClass,
    Position, Stats, StepOutcome, TurnReport, World,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Stats a new character is created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTemplate {
    pub name: String,
    /// Random class when unset
    pub class: Option<PlayerClass>,
    pub hp: i32,
    pub mp: i32,
    pub strength: i32,
    pub defense: i32,
    pub crit: f64,
    pub vision: u32,
}

impl PlayerTemplate {
    /// Creates a character at `position` wearing the starting equipment.
    pub fn build(&self, position: Position, rng: &mut StdRng) -> Player {
        let class = self.class.unwrap_or_else(|| {
            PlayerClass::all()
                .choose(rng)
                .copied()
                .unwrap_or(PlayerClass::Warrior)
        });
        Player::new(
            self.name.clone(),
            class,
            Stats::new(self.hp, self.strength, self.defense, self.crit, self.vision),
            self.mp,
            starting_armor(),
            starting_weapon(),
            position,
        )
    }
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            name: "Hero".to_string(),
            class: None,
            hp: 20,
            mp: 10,
            strength: 4,
            defense: 1,
            crit: 2.0,
            vision: 5,
        }
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub seed: u64,
    /// Pause between a step and the monster turn that follows it
    pub input_delay_ms: u64,
    pub start_depth: u32,
    pub player: PlayerTemplate,
}

impl SessionConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            input_delay_ms: INPUT_DELAY_MS,
            start_depth: STARTING_DEPTH,
            player: PlayerTemplate::default(),
        }
    }

    /// Configuration with no input delay, for tests and fast simulations.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            input_delay_ms: 0,
            ..Self::new(seed)
        }
    }

    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> GameResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        if config.start_depth == 0 {
            return Err(GameError::InvalidState(
                "start_depth must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn input_delay(&self) -> Duration {
        Duration::from_millis(self.input_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Visual state of a tile after it changed. Doors are the only tiles that change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    OpenDoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    DoorOpen,
    Stairs,
}

/// Background music; the deeper track takes over past the switch depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicTrack {
    Dungeon1,
    Dungeon2,
}

impl MusicTrack {
    pub fn for_depth(depth: u32) -> Self {
        if depth > MUSIC_SWITCH_DEPTH {
            MusicTrack::Dungeon2
        } else {
            MusicTrack::Dungeon1
        }
    }
}

/// Notifications for the renderer, animator and audio collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    TileChanged {
        position: Position,
        tile: TileKind,
    },
    DoorOpened {
        position: Position,
        orientation: DoorOrientation,
    },
    SpriteMoved {
        entity: EntityId,
        from: Position,
        to: Position,
        duration_ms: u64,
    },
    SpriteRemoved {
        entity: EntityId,
    },
    DepthChanged {
        depth: u32,
    },
    Sound {
        cue: SoundCue,
    },
    TrackSwitch {
        track: MusicTrack,
    },
    Attacked {
        attacker: EntityId,
        defender: EntityId,
        damage: i32,
        critical: bool,
    },
    EntityDied {
        entity: EntityId,
        name: String,
        killer: Option<EntityId>,
    },
    PlayerPoisoned {
        turns: u32,
    },
    PoisonTick {
        damage: i32,
        turns_left: u32,
    },
    LevelUp {
        level: u32,
    },
    ItemPickedUp {
        item: String,
        slot: usize,
    },
    InventoryFull {
        item: String,
    },
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub steps_taken: u64,
    pub doors_opened: u32,
    pub monsters_slain: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub items_collected: u32,
    pub max_depth_reached: u32,
    pub deaths: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event. `player` tells dealt and taken damage apart.
    pub fn update_from_event(&mut self, event: &GameEvent, player: EntityId) {
        match event {
            GameEvent::SpriteMoved { entity, .. } if *entity == player => {
                self.steps_taken += 1;
            }
            GameEvent::DoorOpened { .. } => {
                self.doors_opened += 1;
            }
            GameEvent::Attacked {
                attacker, damage, ..
            } => {
                let damage = (*damage).max(0) as u64;
                if *attacker == player {
                    self.damage_dealt += damage;
                } else {
                    self.damage_taken += damage;
                }
            }
            GameEvent::PoisonTick { damage, .. } => {
                self.damage_taken += (*damage).max(0) as u64;
            }
            GameEvent::EntityDied { entity, killer, .. } => {
                if *entity == player {
                    self.deaths += 1;
                } else if *killer == Some(player) {
                    self.monsters_slain += 1;
                }
            }
            GameEvent::ItemPickedUp { .. } => {
                self.items_collected += 1;
            }
            GameEvent::DepthChanged { depth } => {
                self.max_depth_reached = self.max_depth_reached.max(*depth);
            }
            _ => {}
        }
    }
}

/// The running game: one world, one player, one random stream.
pub struct Session {
    pub config: SessionConfig,
    pub world: World,
    pub player: Player,
    /// Monster turns completed since the game started
    pub turn: u64,
    pub statistics: GameStatistics,
    pub music: MusicTrack,
    pub(crate) rng: StdRng,
    levels: Box<dyn LevelGenerator>,
    loot: Box<dyn LootTable>,
    events: Vec<GameEvent>,
}

impl Session {
    /// Creates a session, generating and installing the starting level.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{AsciiLevels, NoLoot, Session, SessionConfig};
    ///
    /// let session = Session::new(
    ///     SessionConfig::for_testing(7),
    ///     Box::new(AsciiLevels::builtin()),
    ///     Box::new(NoLoot),
    /// )
    /// .unwrap();
    /// assert_eq!(session.depth(), 1);
    /// assert!(!session.is_step_pending());
    /// ```
    pub fn new(
        config: SessionConfig,
        levels: Box<dyn LevelGenerator>,
        loot: Box<dyn LootTable>,
    ) -> GameResult<Self> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let depth = config.start_depth.max(1);
        let world = Self::build_world(levels.as_ref(), loot.as_ref(), depth, &mut rng)?;
        let player = config.player.build(world.player_start, &mut rng);
        info!(
            "{} the {:?} enters depth {} ({} levels)",
            player.name,
            player.class,
            depth,
            levels.generator_type()
        );

        Ok(Self {
            music: MusicTrack::for_depth(depth),
            statistics: GameStatistics {
                max_depth_reached: depth,
                ..GameStatistics::default()
            },
            config,
            world,
            player,
            turn: 0,
            rng,
            levels,
            loot,
            events: Vec::new(),
        })
    }

    fn build_world(
        levels: &dyn LevelGenerator,
        loot: &dyn LootTable,
        depth: u32,
        rng: &mut StdRng,
    ) -> GameResult<World> {
        let layout = levels.generate(depth, rng)?;
        levels.validate(&layout)?;
        World::install(layout, depth, loot, rng)
    }

    pub fn depth(&self) -> u32 {
        self.world.depth
    }

    pub fn input_delay(&self) -> Duration {
        self.config.input_delay()
    }

    /// True between a resolved player action and the `finish_step` that follows it.
    pub fn is_step_pending(&self) -> bool {
        self.player.moving
    }

    pub fn is_game_over(&self) -> bool {
        self.player.dead
    }

    /// Events emitted since the last drain.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.statistics.update_from_event(&event, self.player.id);
        self.events.push(event);
    }

    /// Completes the pending step and runs one monster turn.
    ///
    /// Returns `None` when no step was pending, in which case nothing happens.
    pub fn finish_step(&mut self) -> Option<TurnReport> {
        if !self.player.moving {
            return None;
        }
        self.player.moving = false;
        if self.player.dead {
            return None;
        }

        let report = run_turn(&mut self.world, &mut self.player, &mut self.rng);
        self.turn += 1;
        self.emit_turn_events(&report);
        debug!(
            "turn {}: {} monsters acted, player hp {}/{}",
            self.turn,
            report.actions.len(),
            self.player.stats.hp,
            self.player.stats.max_hp
        );
        if report.player_died {
            info!(
                "{} died on depth {} after {} turns",
                self.player.name,
                self.depth(),
                self.turn
            );
        }
        Some(report)
    }

    fn emit_turn_events(&mut self, report: &TurnReport) {
        let player = self.player.id;
        let duration_ms = self.config.input_delay_ms;

        if report.poison.damage > 0 {
            self.emit(GameEvent::PoisonTick {
                damage: report.poison.damage,
                turns_left: self.player.poison.turns_left,
            });
            if report.poison.died {
                self.emit(GameEvent::EntityDied {
                    entity: player,
                    name: self.player.name.clone(),
                    killer: None,
                });
            }
        }

        for action in &report.actions {
            if action.moved {
                self.emit(GameEvent::SpriteMoved {
                    entity: action.monster,
                    from: action.from,
                    to: action.to,
                    duration_ms,
                });
            }
            if let Some(attack) = &action.attack {
                self.emit(GameEvent::Attacked {
                    attacker: action.monster,
                    defender: player,
                    damage: attack.damage,
                    critical: attack.critical,
                });
                if let Some(turns) = attack.poison_applied {
                    self.emit(GameEvent::PlayerPoisoned { turns });
                }
                if attack.defender_died {
                    self.emit(GameEvent::EntityDied {
                        entity: player,
                        name: self.player.name.clone(),
                        killer: Some(action.monster),
                    });
                }
            }
        }
    }

    /// Attempts a step and, unless it was blocked, immediately finishes it.
    pub fn step(&mut self, dx: i32, dy: i32) -> GameResult<(StepOutcome, Option<TurnReport>)> {
        let outcome = self.attempt_player_step(dx, dy)?;
        let report = if outcome.is_blocked() {
            None
        } else {
            self.finish_step()
        };
        Ok((outcome, report))
    }

    /// Moves one level down, keeping the player and regenerating everything else.
    pub(crate) fn descend(&mut self) -> GameResult<u32> {
        let depth = self.depth() + 1;
        self.replace_world(depth)?;
        self.emit(GameEvent::Sound {
            cue: SoundCue::Stairs,
        });
        info!("{} descends to depth {}", self.player.name, depth);
        Ok(depth)
    }

    /// Starts a new game at the starting depth with a fresh character.
    pub fn restart(&mut self) -> GameResult<()> {
        let depth = self.config.start_depth.max(1);
        let old_player = self.player.id;
        self.replace_world(depth)?;
        self.emit(GameEvent::SpriteRemoved { entity: old_player });

        self.player = self.config.player.build(self.world.player_start, &mut self.rng);
        self.turn = 0;
        self.statistics = GameStatistics {
            max_depth_reached: depth,
            ..GameStatistics::default()
        };
        info!("new game: {} starts at depth {}", self.player.name, depth);
        Ok(())
    }

    /// Installs a freshly generated level for `depth` and moves the player to its start.
    fn replace_world(&mut self, depth: u32) -> GameResult<()> {
        let world = Self::build_world(self.levels.as_ref(), self.loot.as_ref(), depth, &mut self.rng)?;
        let old_monsters: Vec<EntityId> = self.world.monsters.iter().map(|monster| monster.id).collect();
        self.world = world;
        self.player.position = self.world.player_start;

        for entity in old_monsters {
            self.emit(GameEvent::SpriteRemoved { entity });
        }
        self.emit(GameEvent::DepthChanged { depth });

        let track = MusicTrack::for_depth(depth);
        if track != self.music {
            self.music = track;
            self.emit(GameEvent::TrackSwitch { track });
        }
        Ok(())
    }

    /// Checks every data-model invariant of the player and the world.
    pub fn check_invariants(&self) -> GameResult<()> {
        self.world.check_invariants()?;

        let player = &self.player;
        let stats = &player.stats;
        let violation = |message: String| {
            warn!("invariant violated: {}", message);
            Err(GameError::InvariantViolation(message))
        };
        if stats.hp < 0 || stats.hp > stats.max_hp {
            return violation(format!("player hp {} outside [0, {}]", stats.hp, stats.max_hp));
        }
        if player.dead != (stats.hp == 0) {
            return violation(format!("player dead flag {} with hp {}", player.dead, stats.hp));
        }
        if player.poison.active != (player.poison.turns_left > 0) {
            return violation(format!(
                "poison flag {} with {} turns left",
                player.poison.active, player.poison.turns_left
            ));
        }
        if player.inventory.capacity() != INVENTORY_CAPACITY {
            return violation(format!(
                "inventory has {} slots",
                player.inventory.capacity()
            ));
        }
        if !self.world.is_walkable(player.position) {
            return violation(format!("player off the floor at {}", player.position));
        }
        if let Some(monster) = self.world.monster_at(player.position) {
            return violation(format!("{} shares the player's tile", monster.name()));
        }
        Ok(())
    }
}
