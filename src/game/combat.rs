//! # Combat
//!
//! Attack resolution between any two creatures and the per-turn poison tick.
//!
//! # Formula
//!
//! ```text
//! damage  = attacker.strength
//! critical = uniform(0, 10) < attacker.crit      -> damage *= 2
//! damage += attacker weapon bonus                 (player only)
//! damage -= defender.defense + defender armor     (armor: player only)
//! damage  = max(damage, 1)                        (monster attackers only)
//! ```
//!
//! Species hooks fire on critical hits: a venomous attacker poisons the
//! defender, and a brittle defender struck critically by the player drops to 0.

use crate::config::{CRIT_ROLL_SCALE, MONSTER_DAMAGE_FLOOR, POISON_DAMAGE};
use crate::{Creature, ExperienceGain, OnCrit, Player};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything that happened during one attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    /// Computed damage. Player attacks are unfloored, so this can be zero or negative.
    pub damage: i32,
    pub critical: bool,
    pub defender_died: bool,
    /// Poison turns applied to the defender by the attacker's species hook
    pub poison_applied: Option<u32>,
    pub instant_kill: bool,
    pub experience: Option<ExperienceGain>,
}

/// Outcome of one poison tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoisonTick {
    pub damage: i32,
    /// The poison ran out on this tick
    pub cured: bool,
    pub died: bool,
}

/// Rolls for a critical hit on the `[0, 10)` scale.
pub fn roll_critical<R: Rng + ?Sized>(crit: f64, rng: &mut R) -> bool {
    rng.gen_range(0.0..CRIT_ROLL_SCALE) < crit
}

/// Resolves `attacker` hitting `defender`, mutating both.
///
/// The attacker is mutable because a killing blow by the player awards
/// experience and may level it up.
pub fn resolve_attack<A, D, R>(attacker: &mut A, defender: &mut D, rng: &mut R) -> AttackReport
where
    A: Creature + ?Sized,
    D: Creature + ?Sized,
    R: Rng + ?Sized,
{
    let critical = roll_critical(attacker.stats().crit, rng);
    resolve_attack_with_roll(attacker, defender, critical)
}

/// Same as [`resolve_attack`] with the critical roll already decided.
pub fn resolve_attack_with_roll<A, D>(attacker: &mut A, defender: &mut D, critical: bool) -> AttackReport
where
    A: Creature + ?Sized,
    D: Creature + ?Sized,
{
    let mut damage = attacker.stats().strength;
    let mut poison_applied = None;

    if critical {
        damage *= 2;
        if let OnCrit::ApplyPoison { turns } = attacker.on_crit() {
            if defender.poison(turns) {
                debug!("{} poisoned {} for {} turns", attacker.name(), defender.name(), turns);
                poison_applied = Some(turns);
            }
        }
    }

    let instant_kill =
        critical && attacker.is_player() && defender.on_crit() == OnCrit::InstantKillIfCrit;

    damage += attacker.weapon_bonus();
    damage -= defender.stats().defense + defender.armor_bonus();
    if !attacker.is_player() {
        damage = damage.max(MONSTER_DAMAGE_FLOOR);
    }

    defender.take_damage(damage);
    if instant_kill {
        defender.set_hp(0);
    }

    let defender_died = defender.is_dead();
    let experience = if defender_died {
        attacker.award_kill(defender.experience_reward())
    } else {
        None
    };

    debug!(
        "{} hit {} for {}{} (hp now {})",
        attacker.name(),
        defender.name(),
        damage,
        if critical { " (critical)" } else { "" },
        defender.stats().hp
    );

    AttackReport {
        damage,
        critical,
        defender_died,
        poison_applied,
        instant_kill,
        experience,
    }
}

/// Applies one turn of poison to the player.
pub fn apply_poison_tick(player: &mut Player) -> PoisonTick {
    let mut tick = PoisonTick::default();
    if player.poison.turns_left == 0 {
        return tick;
    }

    player.poison.turns_left -= 1;
    tick.damage = player.take_damage(POISON_DAMAGE);
    if player.poison.turns_left == 0 {
        player.poison.active = false;
        tick.cured = true;
    }

    if player.dead {
        player.poison.turns_left = 0;
        player.poison.active = false;
        tick.died = true;
    }

    debug!(
        "{} suffers {} poison damage, {} turns left",
        player.name, tick.damage, player.poison.turns_left
    );
    tick
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Item, Monster, PlayerClass, Position, Species, Stats};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player_with(strength: i32, defense: i32, crit: f64) -> Player {
        Player::new(
            "Hero".to_string(),
            PlayerClass::Warrior,
            Stats::new(30, strength, defense, crit, 5),
            5,
            Item::armor("Wood Armor", 1),
            Item::weapon("Stone Spear", 1),
            Position::new(2, 2),
        )
    }

    fn monster(species: Species) -> Monster {
        Monster::new(species, Position::new(3, 2), None)
    }

    #[test]
    fn test_player_hit_adds_weapon_and_subtracts_defense() {
        let mut player = player_with(5, 1, 0.0);
        let mut fairy = monster(Species::Fairy);
        let report = resolve_attack_with_roll(&mut player, &mut fairy, false);
        // 5 strength + 1 weapon - 0 defense
        assert_eq!(report.damage, 6);
        assert_eq!(fairy.stats.hp, 14);
        assert!(!report.defender_died);
        assert!(report.experience.is_none());
    }

    #[test]
    fn test_monster_hit_subtracts_defense_and_armor_with_floor() {
        let mut player = player_with(5, 10, 0.0);
        let mut fairy = monster(Species::Fairy);
        let report = resolve_attack_with_roll(&mut fairy, &mut player, false);
        // 2 - 10 - 1 floors to 1
        assert_eq!(report.damage, 1);
        assert_eq!(player.stats.hp, 29);
    }

    #[test]
    fn test_player_damage_has_no_floor() {
        let mut player = player_with(1, 1, 0.0);
        let mut skeleton = monster(Species::Skeleton);
        skeleton.stats.defense = 10;
        skeleton.set_hp(5);
        let report = resolve_attack_with_roll(&mut player, &mut skeleton, false);
        assert_eq!(report.damage, -8);
        // Unfloored damage heals, bounded by max_hp
        assert_eq!(skeleton.stats.hp, 13);
        assert!(!skeleton.dead);
    }

    #[test]
    fn test_critical_doubles_strength_before_bonuses() {
        let mut player = player_with(5, 1, 0.0);
        let mut fairy = monster(Species::Fairy);
        let report = resolve_attack_with_roll(&mut player, &mut fairy, true);
        assert!(report.critical);
        assert_eq!(report.damage, 11);
    }

    #[test]
    fn test_snake_critical_poisons_player() {
        let mut player = player_with(5, 0, 0.0);
        let mut snake = monster(Species::Snake);
        let report = resolve_attack_with_roll(&mut snake, &mut player, true);
        // 3 * 2 - 0 - 1 armor
        assert_eq!(report.damage, 5);
        assert_eq!(report.poison_applied, Some(3));
        assert!(player.is_poisoned());
        assert_eq!(player.poison.turns_left, 3);
    }

    #[test]
    fn test_snake_normal_hit_does_not_poison() {
        let mut player = player_with(5, 0, 0.0);
        let mut snake = monster(Species::Snake);
        let report = resolve_attack_with_roll(&mut snake, &mut player, false);
        assert_eq!(report.poison_applied, None);
        assert!(!player.is_poisoned());
    }

    #[test]
    fn test_player_critical_instantly_kills_skeleton() {
        let mut player = player_with(1, 1, 0.0);
        let mut skeleton = monster(Species::Skeleton);
        let report = resolve_attack_with_roll(&mut player, &mut skeleton, true);
        assert!(report.instant_kill);
        assert!(report.defender_died);
        assert_eq!(skeleton.stats.hp, 0);
        assert!(skeleton.dead);
    }

    #[test]
    fn test_monster_critical_on_skeleton_is_not_instant_kill() {
        let mut snake = monster(Species::Snake);
        let mut skeleton = monster(Species::Skeleton);
        let report = resolve_attack_with_roll(&mut snake, &mut skeleton, true);
        assert!(!report.instant_kill);
        assert!(!skeleton.dead);
    }

    #[test]
    fn test_kill_awards_experience_and_levels_up() {
        let mut player = player_with(50, 1, 0.0);
        player.experience = 98;
        let mut snake = monster(Species::Snake);
        let report = resolve_attack_with_roll(&mut player, &mut snake, false);
        assert!(report.defender_died);
        let experience = report.experience.unwrap();
        assert_eq!(experience.gained, 8);
        assert!(experience.level_up.is_some());
        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 6);
        assert_eq!(player.stats.strength, 52);
        assert_eq!(player.stats.defense, 2);
        assert_eq!(player.stats.max_hp, 33);
    }

    #[test]
    fn test_crit_roll_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(roll_critical(10.0, &mut rng));
            assert!(!roll_critical(0.0, &mut rng));
        }
    }

    #[test]
    fn test_poison_runs_three_turns() {
        let mut player = player_with(5, 0, 0.0);
        player.poison(3);

        let first = apply_poison_tick(&mut player);
        assert_eq!(first.damage, 1);
        assert!(!first.cured);
        let _ = apply_poison_tick(&mut player);
        let third = apply_poison_tick(&mut player);
        assert!(third.cured);
        assert!(!player.is_poisoned());
        assert_eq!(player.poison.turns_left, 0);
        assert_eq!(player.stats.hp, 27);

        assert_eq!(apply_poison_tick(&mut player), PoisonTick::default());
        assert_eq!(player.stats.hp, 27);
    }

    #[test]
    fn test_poison_can_kill() {
        let mut player = player_with(5, 0, 0.0);
        player.set_hp(1);
        player.poison(3);
        let tick = apply_poison_tick(&mut player);
        assert!(tick.died);
        assert!(player.dead);
        assert_eq!(player.stats.hp, 0);
        assert_eq!(player.poison.turns_left, 0);
        assert!(!player.is_poisoned());
    }
}
