//! # Turn Engine
//!
//! One decision phase for every live monster, run after each resolved player
//! action. The player's poison ticks first, then monsters act in list order:
//! attack when orthogonally adjacent, chase when the player is within vision,
//! otherwise wander.

use crate::{
    apply_poison_tick, resolve_attack, AttackReport, EntityId, Player, PoisonTick, Position, World,
};
use log::{debug, error};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Random draw behind a wandering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WanderRoll {
    pub dx: i32,
    pub dy: i32,
    /// Coin flip deciding whether the step is attempted at all
    pub apply: bool,
}

impl WanderRoll {
    /// Draws dx and dy from -1..=1, keeps exactly one axis, then flips the apply coin.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut dx = rng.gen_range(-1..=1);
        let mut dy = rng.gen_range(-1..=1);
        if rng.gen_bool(0.5) {
            dy = 0;
        } else {
            dx = 0;
        }
        let apply = rng.gen_bool(0.5);
        Self { dx, dy, apply }
    }
}

/// What a single monster did this turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterAction {
    pub monster: EntityId,
    pub name: String,
    pub from: Position,
    pub to: Position,
    pub moved: bool,
    pub attack: Option<AttackReport>,
}

impl MonsterAction {
    /// Damage dealt to the player, zero when the monster did not attack.
    pub fn damage(&self) -> i32 {
        self.attack.as_ref().map(|report| report.damage).unwrap_or(0)
    }
}

/// Everything that happened during one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub poison: PoisonTick,
    pub actions: Vec<MonsterAction>,
    pub player_died: bool,
}

/// Advances the world by one turn.
///
/// Dead monsters are skipped. Once the player dies no further monster acts.
pub fn run_turn<R: Rng + ?Sized>(world: &mut World, player: &mut Player, rng: &mut R) -> TurnReport {
    let mut report = TurnReport {
        poison: apply_poison_tick(player),
        ..TurnReport::default()
    };

    for index in 0..world.monsters.len() {
        if player.dead {
            break;
        }
        if world.monsters[index].dead {
            continue;
        }
        report.actions.push(act_monster(world, index, player, rng));
    }

    report.player_died = player.dead;
    report
}

fn act_monster<R: Rng + ?Sized>(
    world: &mut World,
    index: usize,
    player: &mut Player,
    rng: &mut R,
) -> MonsterAction {
    let monster = &world.monsters[index];
    let from = monster.position;
    let vision = monster.stats.vision as f64;
    let mut action = MonsterAction {
        monster: monster.id,
        name: monster.name.clone(),
        from,
        to: from,
        moved: false,
        attack: None,
    };
    if monster.dead {
        error!("dead {} at {} asked to act", monster.name, monster.position);
        return action;
    }

    if from.is_orthogonally_adjacent(player.position) {
        let monster = &mut world.monsters[index];
        action.attack = Some(resolve_attack(monster, player, rng));
        return action;
    }

    let in_sight = from.euclidean_distance(player.position) <= vision;
    let target = if in_sight {
        chase_step(world, from, player.position)
    } else {
        wander_step(world, from, WanderRoll::roll(rng), player.position)
    };

    if let Some(to) = target {
        world.monsters[index].position = to;
        action.to = to;
        action.moved = true;
        debug!("{} moved {} -> {}", action.name, from, to);
    }
    action
}

/// First neighbour, in left, right, up, down order, that is available and
/// does not take the monster further from the player.
pub fn chase_step(world: &World, from: Position, player: Position) -> Option<Position> {
    let current = from.euclidean_distance(player);
    from.cardinal_adjacent_positions()
        .into_iter()
        .find(|&next| {
            world.is_available_for_monster(next, player) && next.euclidean_distance(player) <= current
        })
}

/// Destination of a wandering step, if the roll is applied and the tile is available.
pub fn wander_step(world: &World, from: Position, roll: WanderRoll, player: Position) -> Option<Position> {
    if !roll.apply {
        return None;
    }
    let next = from.offset(roll.dx, roll.dy);
    (next != from && world.is_available_for_monster(next, player)).then_some(next)
}
