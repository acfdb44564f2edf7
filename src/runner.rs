//! # Step Runner
//!
//! Drives a session in real time. Every resolved player action is followed
//! by one input-delay sleep and then the monster turn, so the simulation
//! itself stays synchronous and the delay is the only suspension point.

use crate::{
    GameInput, GameResult, InputHandler, InputResponse, PathCoordinator, PathProgress, Session,
    StepOutcome,
};
use log::debug;

/// Owns a session together with its path coordinator and input mapping.
pub struct Runner {
    pub session: Session,
    pub coordinator: PathCoordinator,
    pub handler: InputHandler,
}

impl Runner {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            coordinator: PathCoordinator::new(),
            handler: InputHandler::new(),
        }
    }

    /// Sleeps for the configured input delay.
    async fn pause(&self) {
        tokio::time::sleep(self.session.input_delay()).await;
    }

    /// Waits out the delay of a pending step, then runs the monster turn.
    async fn settle(&mut self) {
        if self.session.is_step_pending() {
            self.pause().await;
            self.session.finish_step();
        }
    }

    /// Takes one directional step, cancelling any walk in progress.
    pub async fn press(&mut self, dx: i32, dy: i32) -> GameResult<StepOutcome> {
        let response = self
            .handler
            .handle(GameInput::Direction(dx, dy), &mut self.session, &mut self.coordinator)?;
        self.settle().await;
        match response {
            InputResponse::Stepped(outcome) => Ok(outcome),
            _ => Ok(StepOutcome::Blocked),
        }
    }

    /// Applies an input and completes any step it resolved.
    ///
    /// Walks started by the input are not driven; call [`Runner::walk`] for that.
    pub async fn input(&mut self, input: GameInput) -> GameResult<InputResponse> {
        let response = self
            .handler
            .handle(input, &mut self.session, &mut self.coordinator)?;
        if response.needs_finish() {
            self.settle().await;
        }
        Ok(response)
    }

    /// Applies a key. Unmapped keys are ignored.
    pub async fn key(&mut self, key: char) -> GameResult<InputResponse> {
        match self.handler.map_key(key) {
            Some(input) => self.input(input).await,
            None => Ok(InputResponse::Ignored),
        }
    }

    /// Follows the current walk until it finishes.
    pub async fn walk(&mut self) -> GameResult<PathProgress> {
        self.walk_until(|_| false).await
    }

    /// Follows the current walk until it finishes or `stop` holds after a step.
    ///
    /// Stopping early leaves the walk active, so it can be resumed.
    pub async fn walk_until<F>(&mut self, mut stop: F) -> GameResult<PathProgress>
    where
        F: FnMut(&Session) -> bool,
    {
        loop {
            let progress = self.coordinator.advance(&mut self.session)?;
            self.settle().await;
            if progress.is_finished() || stop(&self.session) {
                debug!("walk ended with {:?}", progress);
                return Ok(progress);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{AsciiLevels, NoLoot};
    use crate::{Position, SessionConfig};

    fn runner(maps: &[&str]) -> Runner {
        let levels = AsciiLevels::new(maps.iter().map(|map| map.to_string()).collect());
        let session =
            Session::new(SessionConfig::for_testing(3), Box::new(levels), Box::new(NoLoot)).unwrap();
        Runner::new(session)
    }

    #[tokio::test]
    async fn test_press_finishes_the_step() {
        let mut runner = runner(&["######\n#@..>#\n######"]);
        let outcome = runner.press(1, 0).await.unwrap();
        assert!(matches!(outcome, StepOutcome::Moved { .. }));
        assert!(!runner.session.is_step_pending());
        assert_eq!(runner.session.turn, 1);

        let blocked = runner.press(0, 1).await.unwrap();
        assert!(blocked.is_blocked());
        assert_eq!(runner.session.turn, 1);
    }

    #[tokio::test]
    async fn test_click_then_walk_reaches_tile() {
        let mut runner = runner(&["######\n#@...#\n#...>#\n######"]);
        let target = Position::new(4, 1);
        runner.input(GameInput::TileClicked(target)).await.unwrap();
        assert_eq!(runner.walk().await.unwrap(), PathProgress::Reached);
        assert_eq!(runner.session.player.position, target);
        assert_eq!(runner.session.turn, 3);
    }

    #[tokio::test]
    async fn test_autopilot_walk_can_stop_at_depth() {
        let mut runner = runner(&["#####\n#@.>#\n#####", "######\n#>..@#\n######"]);
        runner.key('p').await.unwrap();
        let progress = runner
            .walk_until(|session| session.depth() >= 3)
            .await
            .unwrap();
        assert!(matches!(progress, PathProgress::Stepped(StepOutcome::StairTransition { depth: 3 })));
        assert!(runner.coordinator.is_active());
    }

    #[test]
    fn test_runner_is_usable_from_blocking_code() {
        let mut runner = runner(&["######\n#@..>#\n######"]);
        let response = tokio_test::block_on(runner.key('d')).unwrap();
        assert!(matches!(response, InputResponse::Stepped(StepOutcome::Moved { .. })));
        assert_eq!(runner.session.player.position, Position::new(2, 1));
        assert_eq!(
            tokio_test::block_on(runner.key('?')).unwrap(),
            InputResponse::Ignored
        );
    }
}
