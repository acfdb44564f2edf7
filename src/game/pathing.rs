//! # Path Coordinator
//!
//! Turns a destination tile into single player steps. The route is
//! recomputed from the player's position before every step, so monsters that
//! wander into the way are routed around. The caller drives the walk: call
//! [`PathCoordinator::advance`], wait out the input delay, call
//! [`Session::finish_step`], repeat while the result is `Stepped`.
//!
//! With autopilot on the destination tracks the current level's stairway and
//! is re-targeted after every descent.

use crate::utils::next_step;
use crate::{GameResult, Position, Session, StepOutcome};
use log::debug;
use serde::{Deserialize, Serialize};

/// Result of one [`PathCoordinator::advance`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathProgress {
    /// A step was issued and the destination is still ahead.
    Stepped(StepOutcome),
    /// The destination was walked onto or bumped.
    Reached,
    Unreachable,
    Cancelled,
}

impl PathProgress {
    /// Whether the walk is over.
    pub fn is_finished(&self) -> bool {
        !matches!(self, PathProgress::Stepped(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCoordinator {
    destination: Option<Position>,
    autopilot: bool,
}

impl PathCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts walking toward `destination`, replacing any current walk.
    ///
    /// A clicked walk is never an autopilot walk, so autopilot is switched off.
    pub fn start(&mut self, destination: Position) {
        debug!("pathing toward {}", destination);
        self.destination = Some(destination);
        self.autopilot = false;
    }

    /// Stops the current walk and autopilot. Returns whether anything was active.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.is_active();
        self.destination = None;
        self.autopilot = false;
        was_active
    }

    /// Switches autopilot on or off and returns the new state.
    pub fn toggle_autopilot(&mut self, session: &Session) -> bool {
        self.autopilot = !self.autopilot;
        self.destination = self.autopilot.then_some(session.world.stairs);
        debug!("autopilot {}", if self.autopilot { "on" } else { "off" });
        self.autopilot
    }

    /// Points autopilot at the stairway of the level now installed.
    pub fn retarget(&mut self, session: &Session) {
        if self.autopilot {
            self.destination = Some(session.world.stairs);
        }
    }

    pub fn is_active(&self) -> bool {
        self.destination.is_some()
    }

    pub fn is_autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn destination(&self) -> Option<Position> {
        self.destination
    }

    /// Issues the next step toward the destination.
    ///
    /// Returns `Reached` without touching the session when the player already
    /// stands on the destination. The walk ends on every result other than
    /// `Stepped`, and an ended walk also switches autopilot off.
    pub fn advance(&mut self, session: &mut Session) -> GameResult<PathProgress> {
        let Some(destination) = self.destination else {
            return Ok(PathProgress::Cancelled);
        };
        if session.is_step_pending() || session.is_game_over() {
            self.cancel();
            return Ok(PathProgress::Cancelled);
        }

        let from = session.player.position;
        if from == destination {
            self.cancel();
            return Ok(PathProgress::Reached);
        }

        let Some(next) = next_step(&session.world, from, destination) else {
            debug!("no path from {} to {}", from, destination);
            self.cancel();
            return Ok(PathProgress::Unreachable);
        };

        // Autopilot only ever heads for the stairway of the current level
        let autopilot = self.autopilot && destination == session.world.stairs;
        let outcome = session.attempt_player_step(next.x - from.x, next.y - from.y)?;
        let progress = match outcome {
            StepOutcome::Blocked => PathProgress::Unreachable,
            StepOutcome::StairTransition { .. } if autopilot => {
                self.retarget(session);
                PathProgress::Stepped(outcome)
            }
            _ if autopilot => PathProgress::Stepped(outcome),
            StepOutcome::StairTransition { .. } if next != destination => {
                debug!("left the level before reaching {}", destination);
                PathProgress::Cancelled
            }
            _ if next == destination => PathProgress::Reached,
            _ => PathProgress::Stepped(outcome),
        };
        if progress.is_finished() {
            self.cancel();
        }
        Ok(progress)
    }
}
