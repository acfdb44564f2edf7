//! Integration tests for stairway transitions between depths.

use delve::{
    AsciiLevels, GameEvent, MusicTrack, NoLoot, PathCoordinator, PathProgress, Position, Session,
    SessionConfig, SoundCue, Species, StepOutcome,
};

const FIRST: &str = "\
########
#@..+.>#
#..s...#
########";

const SECOND: &str = "\
#########
#>+....f#
#..k..@.#
#########";

fn session_with(maps: &[&str]) -> Session {
    let levels = AsciiLevels::new(maps.iter().map(|map| map.to_string()).collect());
    let mut config = SessionConfig::for_testing(98765);
    config.player.hp = 500;
    Session::new(config, Box::new(levels), Box::new(NoLoot)).expect("Failed to create session")
}

/// Walks onto the stairway of the current level with the path coordinator.
fn walk_to_stairs(session: &mut Session) -> PathProgress {
    let mut coordinator = PathCoordinator::new();
    coordinator.start(session.world.stairs);
    for _ in 0..200 {
        let progress = coordinator.advance(session).expect("Step failed");
        session.finish_step();
        if progress.is_finished() {
            return progress;
        }
    }
    panic!("never reached the stairway");
}

#[test]
fn test_stairway_regenerates_level() {
    let mut session = session_with(&[FIRST, SECOND]);
    let first_monsters: Vec<_> = session.world.monsters.iter().map(|m| m.id).collect();
    assert_eq!(session.world.closed_doors().count(), 1);

    // Stand next to the stairway, then take it
    session.world.monsters.clear();
    session.player.position = Position::new(5, 1);
    let outcome = session.attempt_player_step(1, 0).expect("Step failed");
    assert_eq!(outcome, StepOutcome::StairTransition { depth: 2 });

    assert_eq!(session.depth(), 2);
    assert_eq!(session.player.position, Position::new(6, 2));
    assert_eq!(session.world.stairs, Position::new(1, 1));

    let species: Vec<_> = session.world.monsters.iter().map(|m| m.species).collect();
    assert_eq!(species, vec![Species::Fairy, Species::Skeleton]);
    assert!(session
        .world
        .monsters
        .iter()
        .all(|monster| !first_monsters.contains(&monster.id)));

    // Doors belong to the new level and start closed
    assert_eq!(session.world.closed_doors().count(), 1);
    assert!(session.world.is_closed_door(Position::new(2, 1)));
    assert!(!session.world.doors.contains_key(&Position::new(4, 1)));

    let events = session.drain_events();
    assert!(events.contains(&GameEvent::DepthChanged { depth: 2 }));
    assert!(events.contains(&GameEvent::Sound {
        cue: SoundCue::Stairs
    }));
}

#[test]
fn test_stairway_transition_completes_with_a_turn() {
    let mut session = session_with(&[FIRST, SECOND]);
    session.world.monsters.clear();
    session.player.position = Position::new(5, 1);

    session.attempt_player_step(1, 0).expect("Step failed");
    assert!(session.is_step_pending());
    let report = session.finish_step().expect("Turn should run");
    assert_eq!(report.actions.len(), 2);
    assert_eq!(session.turn, 1);
    session.check_invariants().expect("Invariants should hold");
}

#[test]
fn test_walking_to_stairs_descends() {
    let mut session = session_with(&[FIRST, SECOND]);
    session.world.monsters.clear();
    let player = session.player.id;

    let progress = walk_to_stairs(&mut session);
    assert_eq!(progress, PathProgress::Reached);
    assert_eq!(session.depth(), 2);
    assert_eq!(session.player.id, player);
    assert_eq!(session.statistics.doors_opened, 1);
    assert_eq!(session.statistics.max_depth_reached, 2);
}

#[test]
fn test_depth_keeps_increasing_as_levels_cycle() {
    let mut session = session_with(&["#####\n#@.>#\n#####"]);
    for expected in 2..=8 {
        assert_eq!(walk_to_stairs(&mut session), PathProgress::Reached);
        assert_eq!(session.depth(), expected);
    }
    assert_eq!(session.music, MusicTrack::Dungeon2);

    let switches: Vec<_> = session
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, GameEvent::TrackSwitch { .. }))
        .collect();
    assert_eq!(
        switches,
        vec![GameEvent::TrackSwitch {
            track: MusicTrack::Dungeon2
        }]
    );
}

#[test]
fn test_restart_after_descending() {
    let mut session = session_with(&["#####\n#@.>#\n#####", "######\n#>..@#\n######"]);
    walk_to_stairs(&mut session);
    assert_eq!(session.depth(), 2);

    session.restart().expect("Restart failed");
    assert_eq!(session.depth(), 1);
    assert_eq!(session.player.position, Position::new(1, 1));
    assert!(session
        .drain_events()
        .contains(&GameEvent::DepthChanged { depth: 1 }));
}
