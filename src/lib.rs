//! # Delve
//!
//! Turn-and-movement simulation core for a tile-based dungeon crawler.
//!
//! ## Architecture Overview
//!
//! The crate is the rules engine only. Layout generation, rendering, audio and
//! input polling are collaborators that talk to it through narrow seams:
//!
//! - **Entities**: `Player` and `Monster` records sharing the `Creature` trait
//! - **Combat**: attack resolution, critical hits, species hooks, poison, leveling
//! - **Turns**: one decision per live monster after every resolved player action
//! - **Movement**: single-tile steps with door bumps, bump attacks and stair descent
//! - **Pathing**: click-to-walk coordinator that recomputes a shortest path every step
//!
//! Everything mutable lives in one [`Session`]. Presentation layers drain
//! [`GameEvent`]s from it and call [`Session::finish_step`] once the fixed input
//! delay of each step has elapsed (the async [`Runner`] does exactly that).

pub mod game;
pub mod generation;
pub mod input;
pub mod runner;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use runner::*;
pub use utils::*;

/// Core error type for the Delve simulation.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// A level generator produced a layout the simulation cannot install
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// An ASCII map could not be parsed
    #[error("Map parse error on line {line}: {message}")]
    MapParse { line: usize, message: String },

    /// A data-model invariant does not hold
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Result type used throughout the Delve codebase.
pub type GameResult<T> = Result<T, GameError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation constants.
pub mod config {
    /// Fixed delay between accepting one step and the next, in milliseconds
    pub const INPUT_DELAY_MS: u64 = 80;

    /// Number of inventory slots a player carries
    pub const INVENTORY_CAPACITY: usize = 10;

    /// Turns of poison applied by a venomous critical hit
    pub const POISON_TURNS: u32 = 3;

    /// Hit points lost per poisoned turn
    pub const POISON_DAMAGE: i32 = 1;

    /// Experience needed for one level-up
    pub const LEVEL_UP_THRESHOLD: i32 = 100;

    /// Strength gained per level-up
    pub const LEVEL_UP_STRENGTH: i32 = 2;

    /// Defense gained per level-up
    pub const LEVEL_UP_DEFENSE: i32 = 1;

    /// Maximum hit points gained per level-up
    pub const LEVEL_UP_MAX_HP: i32 = 3;

    /// Critical rolls are drawn uniformly from `[0, CRIT_ROLL_SCALE)`
    pub const CRIT_ROLL_SCALE: f64 = 10.0;

    /// Smallest damage a monster attack can deal
    pub const MONSTER_DAMAGE_FLOOR: i32 = 1;

    /// Past this depth the second dungeon track plays
    pub const MUSIC_SWITCH_DEPTH: u32 = 5;

    /// Depth of the first level
    pub const STARTING_DEPTH: u32 = 1;
}
