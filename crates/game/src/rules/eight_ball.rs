use rand_chacha::ChaCha8Rng;

use super::{Judgement, Outcome, RuleSet, ShotContext, Verdict};
use crate::state::{Ball, GameMode, PocketMask};
use crate::table::{self, BALL_COUNT, MONEY_BALL};

const GROUP: u16 = 0x01FC;
const ALL_OBJECT: u16 = 0xFFFC;
const MONEY_BIT: u16 = 1 << MONEY_BALL;

/// Two groups of seven plus the money ball.
#[derive(Debug, Clone, Copy, Default)]
pub struct EightBall;

impl EightBall {
    fn group(index: u8) -> u16 {
        GROUP << (u16::from(index & 1) * 7)
    }

    /// (legal, opponent) masks for the shooter before the money ball is added.
    fn masks(shot: &ShotContext) -> (u16, u16) {
        if shot.open {
            (ALL_OBJECT, 0)
        } else {
            let own = shot.colours ^ shot.turn;
            (Self::group(own), Self::group(own ^ 1))
        }
    }

    fn legal_mask(shot: &ShotContext) -> u16 {
        let (legal, _) = Self::masks(shot);
        if shot.pocketed.intersection(legal) == legal {
            legal | MONEY_BIT
        } else {
            legal
        }
    }
}

impl RuleSet for EightBall {
    fn mode(&self) -> GameMode {
        GameMode::EightBall
    }

    fn rack(&self, balls: &mut [Ball; BALL_COUNT], rng: &mut ChaCha8Rng) -> PocketMask {
        table::rack_triangle(balls, rng)
    }

    fn target_ball(&self, shot: &ShotContext) -> Option<usize> {
        (Self::legal_mask(shot) & MONEY_BIT != 0).then_some(MONEY_BALL)
    }

    fn is_wrong_first_contact(&self, shot: &ShotContext) -> bool {
        let legal = Self::legal_mask(shot);
        match shot.first_contact {
            Some(ball) => legal & (1 << ball) == 0,
            None => true,
        }
    }

    fn settle(&self, shot: &ShotContext) -> Verdict {
        let (legal, opponent) = Self::masks(shot);
        let set_complete = shot.pocketed.intersection(legal) == legal;
        let money_down = shot.pocketed.contains(MONEY_BALL);
        let objective_mask = if set_complete { legal | MONEY_BIT } else { legal };

        let judgement = Judgement {
            win: set_complete && money_down,
            foul: shot.scratched() || self.is_wrong_first_contact(shot),
            deferred_loss: money_down,
            objective: shot.sank_any(objective_mask),
            opponent_sink: shot.sank_any(opponent),
        };

        let outcome = judgement.resolve(shot.turn);
        let mut verdict = Verdict::new(outcome);

        if outcome == Outcome::Continue && shot.open {
            let low = shot.pocketed.count_in(GROUP);
            let high = shot.pocketed.count_in(GROUP << 7);
            if low != high {
                verdict.assign_colours = Some(if low > high {
                    shot.turn
                } else {
                    shot.turn ^ 1
                });
            }
        }

        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CaromScore;

    fn shot(pre_shot: u16, pocketed: u16, first_contact: Option<usize>) -> ShotContext {
        ShotContext {
            turn: 0,
            colours: 0,
            open: true,
            pocketed: PocketMask(pocketed),
            pre_shot: PocketMask(pre_shot),
            first_contact,
            made_point: false,
            made_penalty: false,
            carom: CaromScore::default(),
        }
    }

    #[test]
    fn break_sinking_one_group_closes_table() {
        let verdict = EightBall.settle(&shot(0, 0x000C, Some(9)));
        assert_eq!(verdict.outcome, Outcome::Continue);
        assert_eq!(verdict.assign_colours, Some(0));

        let mut second = shot(0, 0x0600, Some(9));
        second.turn = 1;
        let verdict = EightBall.settle(&second);
        assert_eq!(verdict.assign_colours, Some(0));
    }

    #[test]
    fn even_split_keeps_table_open() {
        let verdict = EightBall.settle(&shot(0, 0x0204, Some(2)));
        assert_eq!(verdict.outcome, Outcome::Continue);
        assert_eq!(verdict.assign_colours, None);
    }

    #[test]
    fn empty_break_passes() {
        let verdict = EightBall.settle(&shot(0, 0, Some(9)));
        assert_eq!(verdict.outcome, Outcome::Pass);
    }

    #[test]
    fn scratch_is_a_foul() {
        let verdict = EightBall.settle(&shot(0, 0x0005, Some(2)));
        assert_eq!(verdict.outcome, Outcome::Foul);
        assert_eq!(verdict.assign_colours, None);
    }

    #[test]
    fn no_contact_is_a_foul() {
        assert_eq!(EightBall.settle(&shot(0, 0, None)).outcome, Outcome::Foul);
    }

    #[test]
    fn hitting_opponent_group_first_is_a_foul() {
        let mut closed = shot(0, 0, Some(10));
        closed.open = false;
        assert!(EightBall.is_wrong_first_contact(&closed));
        assert_eq!(EightBall.settle(&closed).outcome, Outcome::Foul);

        closed.first_contact = Some(4);
        assert!(!EightBall.is_wrong_first_contact(&closed));
    }

    #[test]
    fn money_ball_early_loses() {
        let verdict = EightBall.settle(&shot(0, 0x0006, Some(2)));
        assert_eq!(verdict.outcome, Outcome::GameWon { winner: 1 });
    }

    #[test]
    fn money_ball_after_group_wins() {
        let mut finish = shot(0x01FC, 0x01FE, Some(MONEY_BALL));
        finish.open = false;
        assert_eq!(EightBall.target_ball(&finish), Some(MONEY_BALL));
        assert_eq!(
            EightBall.settle(&finish).outcome,
            Outcome::GameWon { winner: 0 }
        );

        finish.pocketed.insert(0);
        assert_eq!(
            EightBall.settle(&finish).outcome,
            Outcome::GameWon { winner: 1 }
        );
    }

    #[test]
    fn sinking_both_groups_passes() {
        let mut closed = shot(0, 0x0204, Some(2));
        closed.open = false;
        assert_eq!(EightBall.settle(&closed).outcome, Outcome::Pass);
    }
}
