//! # Input Module
//!
//! Maps player inputs onto player steps and the path coordinator.

pub mod commands;

pub use commands::*;

use crate::{GameResult, PathCoordinator, Session};
use log::debug;

/// Input handler for processing player commands.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GameInput, InputHandler};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.map_key('d'), Some(GameInput::Direction(1, 0)));
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// Decodes a keyboard key. WASD always moves; hjkl moves when enabled.
    pub fn map_key(&self, key: char) -> Option<GameInput> {
        let input = match key.to_ascii_lowercase() {
            'w' => GameInput::Direction(0, -1),
            's' => GameInput::Direction(0, 1),
            'a' => GameInput::Direction(-1, 0),
            'd' => GameInput::Direction(1, 0),
            'k' if self.vi_keys_enabled => GameInput::Direction(0, -1),
            'j' if self.vi_keys_enabled => GameInput::Direction(0, 1),
            'h' if self.vi_keys_enabled => GameInput::Direction(-1, 0),
            'l' if self.vi_keys_enabled => GameInput::Direction(1, 0),
            'p' => GameInput::AutopilotToggled,
            'r' => GameInput::Restart,
            'x' => GameInput::RightClick,
            _ => return None,
        };
        Some(input)
    }

    /// Applies one input.
    ///
    /// Directional steps are resolved but not finished; the caller waits out
    /// the input delay and calls `finish_step` when the response says so.
    /// Walks are started here and driven with `PathCoordinator::advance`.
    pub fn handle(
        &self,
        input: GameInput,
        session: &mut Session,
        coordinator: &mut PathCoordinator,
    ) -> GameResult<InputResponse> {
        debug!("input {:?}", input);
        let response = match input {
            GameInput::Direction(dx, dy) => {
                coordinator.cancel();
                InputResponse::Stepped(session.attempt_player_step(dx, dy)?)
            }
            GameInput::TileClicked(_) if coordinator.is_active() => {
                coordinator.cancel();
                InputResponse::PathCancelled
            }
            GameInput::TileClicked(position) => {
                if session.is_step_pending() || session.is_game_over() {
                    InputResponse::Ignored
                } else {
                    coordinator.start(position);
                    InputResponse::PathStarted(position)
                }
            }
            GameInput::RightClick => {
                if coordinator.cancel() {
                    InputResponse::PathCancelled
                } else {
                    InputResponse::Ignored
                }
            }
            GameInput::AutopilotToggled => {
                InputResponse::Autopilot(coordinator.toggle_autopilot(session))
            }
            GameInput::Restart => {
                coordinator.cancel();
                session.restart()?;
                InputResponse::Restarted
            }
        };
        Ok(response)
    }
}
