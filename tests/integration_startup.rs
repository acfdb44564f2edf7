//! Integration tests to ensure a session can start up and play without errors.

use delve::{
    find_path, AsciiLevels, GameEvent, GameResult, NoLoot, PathProgress, Position, Runner, Session,
    SessionConfig, StandardLoot,
};

#[test]
fn test_basic_startup() -> GameResult<()> {
    let session = Session::new(
        SessionConfig::for_testing(12345),
        Box::new(AsciiLevels::builtin()),
        Box::new(StandardLoot::new()),
    )?;

    assert_eq!(session.depth(), 1);
    assert_eq!(session.turn, 0);
    assert!(!session.is_game_over());
    assert!(!session.is_step_pending());
    assert!(session.world.is_walkable(session.player.position));
    assert_eq!(session.player.position, session.world.player_start);
    assert_eq!(session.player.weapon.name, "Stone Spear");
    assert_eq!(session.player.armor.name, "Wood Armor");
    session.check_invariants()?;

    Ok(())
}

#[test]
fn test_same_seed_same_game() -> GameResult<()> {
    let play = |seed| -> GameResult<(Position, Vec<Position>, i32)> {
        let mut session = Session::new(
            SessionConfig::for_testing(seed),
            Box::new(AsciiLevels::builtin()),
            Box::new(StandardLoot::new()),
        )?;
        for (dx, dy) in [(1, 0), (1, 0), (0, 1), (0, 1), (1, 0), (-1, 0)] {
            session.step(dx, dy)?;
        }
        let monsters = session.world.monsters.iter().map(|m| m.position).collect();
        Ok((session.player.position, monsters, session.player.stats.hp))
    };

    assert_eq!(play(777)?, play(777)?);
    Ok(())
}

#[test]
fn test_config_and_level_files() -> GameResult<()> {
    let dir = tempfile::tempdir()?;
    let config_path = dir.path().join("session.json");
    let map_path = dir.path().join("levels.txt");
    std::fs::write(
        &config_path,
        r#"{"seed": 31, "input_delay_ms": 0, "player": {"name": "Tester", "hp": 40}}"#,
    )?;
    std::fs::write(
        &map_path,
        "#######\n#@.+.>#\n#######\n---\n######\n#>..@#\n######\n",
    )?;

    let config = SessionConfig::from_json_file(&config_path)?;
    let levels = AsciiLevels::from_file(&map_path)?;
    assert_eq!(levels.len(), 2);

    let mut session = Session::new(config, Box::new(levels), Box::new(NoLoot))?;
    assert_eq!(session.player.name, "Tester");
    assert_eq!(session.player.stats.max_hp, 40);

    session.step(1, 0)?;
    session.step(1, 0)?;
    assert_eq!(session.player.position, Position::new(2, 1));
    assert!(session
        .drain_events()
        .iter()
        .any(|event| matches!(event, GameEvent::DoorOpened { .. })));

    Ok(())
}

#[test]
fn test_bad_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("broken.txt");
    std::fs::write(&map_path, "#####\n#@.Z#\n#####\n").unwrap();

    assert!(matches!(
        AsciiLevels::from_file(&map_path),
        Err(delve::GameError::MapParse { line: 2, .. })
    ));

    // A later map in the set is rejected at load time too
    std::fs::write(&map_path, "#####\n#@.>#\n#####\n---\n#####\n#@>>#\n#####\n").unwrap();
    assert!(AsciiLevels::from_file(&map_path).is_err());

    let levels = AsciiLevels::new(vec!["#####\n#@.Z#\n#####".to_string()]);
    let result = Session::new(
        SessionConfig::for_testing(1),
        Box::new(levels),
        Box::new(NoLoot),
    );
    assert!(matches!(result, Err(delve::GameError::MapParse { line: 2, .. })));

    assert!(SessionConfig::from_json_file(dir.path().join("missing.json")).is_err());
}

#[tokio::test]
async fn test_autopilot_keeps_invariants_on_builtin_levels() -> GameResult<()> {
    let mut config = SessionConfig::for_testing(2024);
    config.player.hp = 1000;
    let session = Session::new(
        config,
        Box::new(AsciiLevels::builtin()),
        Box::new(StandardLoot::new()),
    )?;
    let mut runner = Runner::new(session);
    runner.input(delve::GameInput::AutopilotToggled).await?;

    for _ in 0..400 {
        if runner.session.depth() > 3 {
            break;
        }
        let progress = runner.walk_until(|_| true).await?;
        runner.session.check_invariants()?;
        if progress == PathProgress::Unreachable {
            // A monster blocks the only way on: go and fight the closest one
            let player = runner.session.player.position;
            let closest = runner
                .session
                .world
                .live_monsters()
                .filter_map(|monster| {
                    find_path(&runner.session.world, player, monster.position)
                        .map(|path| (path.len(), monster.position))
                })
                .min();
            if let Some((_, target)) = closest {
                runner.coordinator.cancel();
                runner.coordinator.start(target);
                runner.walk().await?;
            }
            if !runner.coordinator.is_autopilot() {
                runner.input(delve::GameInput::AutopilotToggled).await?;
            }
            runner.coordinator.retarget(&runner.session);
        }
    }

    assert!(runner.session.statistics.max_depth_reached >= 2);
    Ok(())
}
