use rand_chacha::ChaCha8Rng;

use super::{Judgement, RuleSet, ShotContext, Verdict};
use crate::state::{Ball, GameMode, PocketMask};
use crate::table::{self, BALL_COUNT, MONEY_BALL, ROTATION_MONEY_BALL};

const RACKED: u16 = 0x03FE;

/// Lowest numbered ball still on the table.
///
/// Id 1 carries the number between ids 8 and 9, so the scan visits 2..=8, then 1, then 9..=15.
pub fn lowest_ball(pocketed: PocketMask) -> Option<usize> {
    (2..=8)
        .chain(std::iter::once(MONEY_BALL))
        .chain(9..BALL_COUNT)
        .find(|&id| !pocketed.contains(id))
}

/// Rotation: always strike the lowest ball first, the nine wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NineBall;

impl RuleSet for NineBall {
    fn mode(&self) -> GameMode {
        GameMode::NineBall
    }

    fn rack(&self, balls: &mut [Ball; BALL_COUNT], rng: &mut ChaCha8Rng) -> PocketMask {
        table::rack_diamond(balls, rng)
    }

    fn target_ball(&self, shot: &ShotContext) -> Option<usize> {
        lowest_ball(shot.pocketed)
    }

    fn is_wrong_first_contact(&self, shot: &ShotContext) -> bool {
        match lowest_ball(shot.pre_shot) {
            Some(lowest) => shot.first_contact != Some(lowest),
            None => false,
        }
    }

    fn settle(&self, shot: &ShotContext) -> Verdict {
        let judgement = Judgement {
            win: shot.pocketed.contains(ROTATION_MONEY_BALL),
            foul: shot.scratched() || self.is_wrong_first_contact(shot),
            deferred_loss: false,
            objective: shot.sank_any(RACKED),
            opponent_sink: false,
        };
        Verdict::new(judgement.resolve(shot.turn))
    }
}
