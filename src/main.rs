//! # Delve Main Entry Point
//!
//! Headless runs of the simulation: autopilot through a number of levels, or
//! a scripted key sequence, logging the event stream as it happens.

use clap::Parser;
use delve::{
    find_path, AsciiLevels, GameError, GameInput, GameResult, InputResponse, PathProgress, Runner,
    Session, SessionConfig, StandardLoot,
};
use log::{debug, info, warn, LevelFilter};
use std::path::PathBuf;
use std::str::FromStr;

/// Upper bound on autopilot steps, in case a level cannot be finished.
const MAX_AUTOPILOT_STEPS: u32 = 10_000;

/// Command line arguments for delve.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Headless turn-and-movement simulation of a tile-based dungeon crawler")]
#[command(version)]
struct Args {
    /// Random seed for the session (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Session configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Level set file: ASCII maps separated by `---` lines
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of levels to descend on autopilot
    #[arg(long, default_value_t = 3)]
    levels: u32,

    /// Input delay per step in milliseconds (overrides the config file)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print every game event to stdout as a JSON line
    #[arg(long)]
    events_json: bool,

    /// Play a key sequence (wasd/hjkl move, p autopilot, x cancel, r restart) instead of autopilot
    #[arg(long)]
    keys: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> GameResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting delve v{}", delve::VERSION);

    let mut config = match &args.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.input_delay_ms = delay_ms;
    }

    let levels = match &args.map {
        Some(path) => AsciiLevels::from_file(path)?,
        None => AsciiLevels::builtin(),
    };
    info!("Seed {}, {} maps in the level set", config.seed, levels.len());

    let session = Session::new(config, Box::new(levels), Box::new(StandardLoot::new()))?;
    let mut runner = Runner::new(session);
    publish_events(&mut runner.session, args.events_json)?;

    match &args.keys {
        Some(keys) => run_keys(&mut runner, keys, &args).await?,
        None => run_autopilot(&mut runner, &args).await?,
    }

    runner.session.check_invariants()?;
    let stats = &runner.session.statistics;
    info!(
        "Finished on depth {} after {} turns: {} steps, {} doors, {} kills, {} damage dealt, {} taken, {} items{}",
        runner.session.depth(),
        runner.session.turn,
        stats.steps_taken,
        stats.doors_opened,
        stats.monsters_slain,
        stats.damage_dealt,
        stats.damage_taken,
        stats.items_collected,
        if runner.session.is_game_over() { " (dead)" } else { "" }
    );
    Ok(())
}

/// Initializes the logging system based on the specified log level.
///
/// `RUST_LOG` takes precedence when set.
fn initialize_logging(log_level: &str) -> GameResult<()> {
    let level = LevelFilter::from_str(log_level)
        .map_err(|_| GameError::InvalidState(format!("unknown log level '{}'", log_level)))?;
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.to_string().to_lowercase()),
    )
    .format_timestamp_secs()
    .try_init();
    Ok(())
}

/// Drains the session's events to stdout (JSON) or the debug log.
fn publish_events(session: &mut Session, json: bool) -> GameResult<()> {
    for event in session.drain_events() {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            debug!("{:?}", event);
        }
    }
    Ok(())
}

/// Descends `args.levels` levels on autopilot, fighting whatever blocks the way.
async fn run_autopilot(runner: &mut Runner, args: &Args) -> GameResult<()> {
    let target_depth = runner.session.depth() + args.levels;
    runner.input(GameInput::AutopilotToggled).await?;

    let mut steps = 0;
    while !runner.session.is_game_over() && runner.session.depth() < target_depth {
        steps += 1;
        if steps > MAX_AUTOPILOT_STEPS {
            warn!("autopilot gave up after {} steps", MAX_AUTOPILOT_STEPS);
            break;
        }

        let progress = runner.walk_until(|_| true).await?;
        publish_events(&mut runner.session, args.events_json)?;
        match progress {
            PathProgress::Stepped(_) => {}
            PathProgress::Unreachable => {
                if !engage_nearest_monster(runner, args.events_json).await? {
                    warn!(
                        "autopilot stuck at {} on depth {}",
                        runner.session.player.position,
                        runner.session.depth()
                    );
                    break;
                }
                if !runner.coordinator.is_autopilot() {
                    runner.input(GameInput::AutopilotToggled).await?;
                }
                runner.coordinator.retarget(&runner.session);
            }
            PathProgress::Reached | PathProgress::Cancelled => break,
        }
    }
    Ok(())
}

/// Walks to the closest reachable live monster and attacks it once.
///
/// Returns false when no monster can be reached.
async fn engage_nearest_monster(runner: &mut Runner, json: bool) -> GameResult<bool> {
    let player = runner.session.player.position;
    let mut targets: Vec<_> = runner
        .session
        .world
        .live_monsters()
        .filter_map(|monster| {
            find_path(&runner.session.world, player, monster.position)
                .map(|path| (path.len(), monster.position))
        })
        .collect();
    targets.sort();
    let Some(&(_, target)) = targets.first() else {
        return Ok(false);
    };

    debug!("engaging monster at {}", target);
    runner.coordinator.cancel();
    runner.input(GameInput::TileClicked(target)).await?;
    runner.walk().await?;
    publish_events(&mut runner.session, json)?;
    Ok(true)
}

/// Plays a key script. Turning autopilot on hands control to autopilot.
async fn run_keys(runner: &mut Runner, keys: &str, args: &Args) -> GameResult<()> {
    for key in keys.chars() {
        if runner.session.is_game_over() {
            break;
        }
        let response = runner.key(key).await?;
        publish_events(&mut runner.session, args.events_json)?;
        match response {
            InputResponse::Ignored if runner.handler.map_key(key).is_none() => {
                warn!("unmapped key '{}'", key);
            }
            InputResponse::Autopilot(true) => {
                runner.coordinator.cancel();
                return run_autopilot(runner, args).await;
            }
            _ => {}
        }
    }
    Ok(())
}
