//! # Command Definitions
//!
//! Inputs the game reacts to and what handling them did.

use crate::{Position, StepOutcome};
use serde::{Deserialize, Serialize};

/// Player input, already decoded from whatever device produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameInput {
    /// One-tile step by (dx, dy)
    Direction(i32, i32),
    /// Click on a tile: start walking there, or stop the current walk
    TileClicked(Position),
    RightClick,
    AutopilotToggled,
    Restart,
}

/// What the input handler did with an input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputResponse {
    Stepped(StepOutcome),
    PathStarted(Position),
    PathCancelled,
    Autopilot(bool),
    Restarted,
    Ignored,
}

impl InputResponse {
    /// Whether a step was resolved and now waits for `finish_step`.
    pub fn needs_finish(&self) -> bool {
        matches!(self, InputResponse::Stepped(outcome) if !outcome.is_blocked())
    }
}
