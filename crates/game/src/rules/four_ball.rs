use rand_chacha::ChaCha8Rng;

use super::{Judgement, RuleSet, ShotContext, Verdict};
use crate::state::{Ball, GameMode, PocketMask};
use crate::table::{self, BALL_COUNT};

/// Pocketless carom. Points are counted during the shot; settle only reads them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FourBall;

impl RuleSet for FourBall {
    fn mode(&self) -> GameMode {
        GameMode::FourBall
    }

    fn rack(&self, balls: &mut [Ball; BALL_COUNT], _rng: &mut ChaCha8Rng) -> PocketMask {
        table::rack_carom(balls)
    }

    fn target_ball(&self, _shot: &ShotContext) -> Option<usize> {
        None
    }

    fn is_wrong_first_contact(&self, _shot: &ShotContext) -> bool {
        false
    }

    fn settle(&self, shot: &ShotContext) -> Verdict {
        let judgement = Judgement {
            win: shot.carom.has_won(shot.turn),
            foul: false,
            deferred_loss: false,
            objective: shot.made_point,
            opponent_sink: shot.made_penalty,
        };
        Verdict::new(judgement.resolve(shot.turn))
    }
}
