//! Property tests for combat, poison and leveling.

use delve::{
    apply_poison_tick, resolve_attack, resolve_attack_with_roll, AsciiLevels, Creature, Item,
    Monster, NoLoot, Player, PlayerClass, Position, Session, SessionConfig, Species, Stats,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn species_strategy() -> impl Strategy<Value = Species> {
    prop_oneof![
        Just(Species::Snake),
        Just(Species::Skeleton),
        Just(Species::Fairy)
    ]
}

fn stats_strategy() -> impl Strategy<Value = Stats> {
    (-5i32..60, -5i32..25, -5i32..25, 0.0f64..12.0, 0u32..8).prop_map(
        |(hp, strength, defense, crit, vision)| Stats::new(hp, strength, defense, crit, vision),
    )
}

fn player_from(stats: Stats, weapon: i32, armor: i32) -> Player {
    Player::new(
        "Prop".to_string(),
        PlayerClass::Rogue,
        stats,
        0,
        Item::armor("Test Armor", armor),
        Item::weapon("Test Weapon", weapon),
        Position::new(1, 1),
    )
}

fn monster_from(species: Species, stats: Stats) -> Monster {
    let mut monster = Monster::new(species, Position::new(2, 1), None);
    monster.dead = stats.hp == 0;
    monster.stats = stats;
    monster
}

fn assert_consistent<C: Creature>(creature: &C) {
    let stats = creature.stats();
    assert!(stats.hp >= 0, "{} hp {} below zero", creature.name(), stats.hp);
    assert!(
        stats.hp <= stats.max_hp,
        "{} hp {} above max {}",
        creature.name(),
        stats.hp,
        stats.max_hp
    );
    assert_eq!(creature.is_dead(), stats.hp == 0);
}

proptest! {
    #[test]
    fn prop_hp_and_death_stay_consistent(
        species in species_strategy(),
        player_stats in stats_strategy(),
        monster_stats in stats_strategy(),
        weapon in -3i32..6,
        armor in -3i32..6,
        seed in any::<u64>(),
        rounds in 1usize..12,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut player = player_from(player_stats, weapon, armor);
        let mut monster = monster_from(species, monster_stats);

        for _ in 0..rounds {
            resolve_attack(&mut player, &mut monster, &mut rng);
            assert_consistent(&player);
            assert_consistent(&monster);

            resolve_attack(&mut monster, &mut player, &mut rng);
            assert_consistent(&player);
            assert_consistent(&monster);

            apply_poison_tick(&mut player);
            assert_consistent(&player);
            prop_assert_eq!(player.poison.active, player.poison.turns_left > 0);
        }
    }

    #[test]
    fn prop_monster_hits_always_deal_at_least_one(
        species in species_strategy(),
        player_stats in stats_strategy(),
        armor in 0i32..50,
        critical in any::<bool>(),
    ) {
        let mut player = player_from(player_stats, 0, armor);
        let mut monster = Monster::new(species, Position::new(2, 1), None);
        let report = resolve_attack_with_roll(&mut monster, &mut player, critical);
        prop_assert!(report.damage >= 1);
    }

    #[test]
    fn prop_experience_carries_remainder(start in 0i32..100, reward in 0i32..60, level in 1u32..10) {
        let mut player = player_from(Stats::new(30, 5, 1, 0.0, 5), 1, 1);
        player.experience = start;
        player.level = level;
        let strength = player.stats.strength;

        let gain = player.award_kill(reward).expect("the player earns experience");
        prop_assert_eq!(gain.gained, reward - level as i32 * 2);
        if start + gain.gained >= 100 {
            prop_assert!(gain.level_up.is_some());
            prop_assert_eq!(player.experience, start + gain.gained - 100);
            prop_assert_eq!(player.level, level + 1);
            prop_assert_eq!(player.stats.strength, strength + 2);
        } else {
            prop_assert!(gain.level_up.is_none());
            prop_assert_eq!(player.experience, start + gain.gained);
            prop_assert_eq!(player.level, level);
        }
    }
}

#[test]
fn test_experience_example_from_ninety_eight() {
    let mut player = player_from(Stats::new(30, 5, 1, 0.0, 5), 1, 1);
    player.experience = 98;
    let mut snake = Monster::new(Species::Snake, Position::new(2, 1), None);
    snake.set_hp(1);

    let report = resolve_attack_with_roll(&mut player, &mut snake, false);
    let gain = report.experience.expect("kill awards experience");
    assert_eq!(gain.gained, 8);
    assert!(gain.level_up.is_some());
    assert_eq!(player.experience, 6);
    assert_eq!(player.level, 2);
    assert_eq!(player.stats.strength, 7);
    assert_eq!(player.stats.defense, 2);
    assert_eq!(player.stats.max_hp, 33);
    assert_eq!(player.stats.hp, 30);
}

#[test]
fn test_snake_critical_poisons_for_three_turns() {
    let levels = AsciiLevels::new(vec!["#######\n#@...>#\n#######".to_string()]);
    let mut session =
        Session::new(SessionConfig::for_testing(8), Box::new(levels), Box::new(NoLoot)).unwrap();
    session.player.stats.defense = 0;
    session.player.armor = Item::armor("Rags", 0);
    let mut snake = Monster::new(Species::Snake, Position::new(9, 9), None);

    let before = session.player.stats.hp;
    let report = resolve_attack_with_roll(&mut snake, &mut session.player, true);
    assert_eq!(report.damage, 6);
    assert_eq!(report.poison_applied, Some(3));
    assert!(session.player.is_poisoned());
    assert_eq!(session.player.stats.hp, before - 6);

    let after_hit = session.player.stats.hp;
    let steps = [(1, 0), (1, 0), (-1, 0)];
    for (turn, (dx, dy)) in steps.into_iter().enumerate() {
        let (_, report) = session.step(dx, dy).unwrap();
        let report = report.expect("a turn follows every step");
        assert_eq!(report.poison.damage, 1);
        assert_eq!(session.player.stats.hp, after_hit - turn as i32 - 1);
    }
    assert!(!session.player.is_poisoned());
    assert_eq!(session.player.poison.turns_left, 0);

    session.step(1, 0).unwrap();
    assert_eq!(session.player.stats.hp, after_hit - 3);
}
