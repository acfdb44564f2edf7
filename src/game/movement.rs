//! # Movement
//!
//! Single-tile player steps: walls block, closed doors open in place, live
//! occupants are attacked in place, the stairway leads one level down, and
//! anything else moves the player and picks up what lies on the tile.

use crate::{
    resolve_attack, AttackReport, Direction, EntityId, GameEvent, GameResult, Pickup, Position,
    Session, SoundCue, TileKind,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Result of one attempted player step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Nothing happened: mid-move, dead, not a cardinal step, or not walkable.
    Blocked,
    DoorOpened(Position),
    /// The player bumped into a live monster and attacked it.
    Attacked {
        target: EntityId,
        report: AttackReport,
    },
    Moved {
        from: Position,
        to: Position,
    },
    StairTransition {
        depth: u32,
    },
}

impl StepOutcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, StepOutcome::Blocked)
    }

    /// Whether the player stayed put while acting on the target tile.
    pub fn is_bump(&self) -> bool {
        matches!(self, StepOutcome::DoorOpened(_) | StepOutcome::Attacked { .. })
    }
}

impl Session {
    /// Resolves a one-tile player step by `(dx, dy)`.
    ///
    /// Every outcome except [`StepOutcome::Blocked`] leaves the player
    /// `moving` until [`Session::finish_step`] runs. Errors only come from
    /// generating the next level on a stair transition.
    pub fn attempt_player_step(&mut self, dx: i32, dy: i32) -> GameResult<StepOutcome> {
        if self.player.moving || self.player.dead {
            return Ok(StepOutcome::Blocked);
        }
        if Direction::from_delta(Position::new(dx, dy)).is_none() {
            debug!("ignoring non-cardinal step ({}, {})", dx, dy);
            return Ok(StepOutcome::Blocked);
        }

        let from = self.player.position;
        let target = from.offset(dx, dy);

        if !self.world.is_walkable(target) {
            if !self.world.is_wall(target) {
                warn!("step into undefined tile {}", target);
            }
            return Ok(StepOutcome::Blocked);
        }

        if self.world.is_closed_door(target) {
            return Ok(self.open_door(target));
        }

        if let Some(index) = self.world.live_monster_index_at(target) {
            return Ok(self.bump_attack(index));
        }

        if target == self.world.stairs {
            // A failed descent leaves the session untouched
            let depth = self.descend()?;
            self.player.moving = true;
            return Ok(StepOutcome::StairTransition { depth });
        }

        self.player.position = target;
        self.player.moving = true;

        self.emit(GameEvent::SpriteMoved {
            entity: self.player.id,
            from,
            to: target,
            duration_ms: self.config.input_delay_ms,
        });
        self.pick_up_items(target);
        debug!("{} moved {} -> {}", self.player.name, from, target);
        Ok(StepOutcome::Moved { from, to: target })
    }

    fn open_door(&mut self, position: Position) -> StepOutcome {
        self.player.moving = true;
        let Some(door) = self.world.open_door(position) else {
            return StepOutcome::DoorOpened(position);
        };
        let orientation = door.orientation;
        self.emit(GameEvent::TileChanged {
            position,
            tile: TileKind::OpenDoor,
        });
        self.emit(GameEvent::DoorOpened {
            position,
            orientation,
        });
        self.emit(GameEvent::Sound {
            cue: SoundCue::DoorOpen,
        });
        debug!("door opened at {}", position);
        StepOutcome::DoorOpened(position)
    }

    fn bump_attack(&mut self, index: usize) -> StepOutcome {
        self.player.moving = true;
        let monster = &mut self.world.monsters[index];
        let report = resolve_attack(&mut self.player, monster, &mut self.rng);
        let target = monster.id;
        let name = monster.name.clone();
        let position = monster.position;
        let dropped = if report.defender_died {
            monster.dropped_item.take()
        } else {
            None
        };

        self.emit(GameEvent::Attacked {
            attacker: self.player.id,
            defender: target,
            damage: report.damage,
            critical: report.critical,
        });
        debug!(
            "{} hits {} for {}{}",
            self.player.name,
            name,
            report.damage,
            if report.critical { " (critical)" } else { "" }
        );

        if report.defender_died {
            self.emit(GameEvent::EntityDied {
                entity: target,
                name: name.clone(),
                killer: Some(self.player.id),
            });
            info!("{} slain at {}", name, position);
            if let Some(item) = dropped {
                debug!("{} dropped {}", name, item.name);
                self.world.drop_item(position, item);
            }
        }
        if let Some(level_up) = report.experience.and_then(|gain| gain.level_up) {
            info!("{} reached level {}", self.player.name, level_up.new_level);
            self.emit(GameEvent::LevelUp {
                level: level_up.new_level,
            });
        }

        StepOutcome::Attacked { target, report }
    }

    fn pick_up_items(&mut self, position: Position) {
        for item in self.world.take_items(position) {
            match self.player.pickup(item) {
                Pickup::Stored(slot) => {
                    let item = self.player.inventory.slots()[slot]
                        .as_ref()
                        .map(|item| item.name.clone())
                        .unwrap_or_default();
                    self.emit(GameEvent::ItemPickedUp { item, slot });
                }
                Pickup::Full(item) => {
                    self.emit(GameEvent::InventoryFull {
                        item: item.name.clone(),
                    });
                    self.world.drop_item(position, item);
                }
            }
        }
    }
}
