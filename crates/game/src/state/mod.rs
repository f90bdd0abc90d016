mod ball;
mod game;
mod previous;
mod shot;

pub use ball::{Ball, PocketMask};
pub use game::{CaromRegion, CaromScore, GameMode, GameState, TimerMode};
pub use previous::{PreviousState, Transitions};
pub use shot::{ContactScore, ShotTracker};

use crate::table::{BALL_COUNT, BALL_DIAMETER_SQ, CUE_BALL};

/// Everything one peer knows about the table. Owned by a single `Peer`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    pub balls: [Ball; BALL_COUNT],
    /// Pocketed balls. Forced to the carom mask in four-ball.
    pub pocketed: PocketMask,
    pub game: GameState,
    pub carom: CaromScore,
    /// Sequence counter of the last applied record.
    pub clock: u16,
    pub game_id: u16,
    pub shot: ShotTracker,
    /// Pocketed mask when the current shot was struck.
    pub pre_shot_pocketed: PocketMask,
    pub previous: PreviousState,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            balls: [Ball::default(); BALL_COUNT],
            pocketed: PocketMask::EMPTY,
            game: GameState::default(),
            carom: CaromScore::default(),
            clock: 0,
            game_id: 0,
            shot: ShotTracker::default(),
            pre_shot_pocketed: PocketMask::EMPTY,
            previous: PreviousState::default(),
        }
    }
}

impl TableState {
    pub fn cue(&self) -> &Ball {
        &self.balls[CUE_BALL]
    }

    pub fn is_pocketed(&self, ball: usize) -> bool {
        self.pocketed.contains(ball)
    }

    /// Whether the cue ball overlaps a ball on the table.
    pub fn cue_is_obstructed(&self) -> bool {
        let cue = self.balls[CUE_BALL].position;
        let last = self.game.mode.last_ball();
        (1..=last)
            .filter(|&id| !self.pocketed.contains(id))
            .any(|id| cue.distance_squared(self.balls[id].position) < BALL_DIAMETER_SQ)
    }

    pub fn stop_all(&mut self) {
        for ball in &mut self.balls {
            ball.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn default_state_starts_over() {
        let state = TableState::default();
        assert!(state.game.game_over);
        assert!(state.game.open);
        assert_eq!(state.clock, 0);
    }

    #[test]
    fn obstruction_ignores_balls_outside_rack() {
        let mut state = TableState::default();
        for (id, ball) in state.balls.iter_mut().enumerate() {
            ball.position = Vec3::new(id as f32 * 0.1, 0.0, 0.3);
        }
        state.balls[CUE_BALL].position = Vec3::ZERO;
        state.balls[12].position = Vec3::new(0.01, 0.0, 0.0);

        state.game.mode = GameMode::EightBall;
        assert!(state.cue_is_obstructed());

        state.game.mode = GameMode::NineBall;
        assert!(!state.cue_is_obstructed());

        state.game.mode = GameMode::EightBall;
        state.pocketed.insert(12);
        assert!(!state.cue_is_obstructed());
    }
}
