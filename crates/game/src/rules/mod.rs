mod eight_ball;
mod four_ball;
mod nine_ball;

pub use eight_ball::EightBall;
pub use four_ball::FourBall;
pub use nine_ball::{NineBall, lowest_ball};

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::state::{Ball, CaromScore, GameMode, PocketMask, TableState};
use crate::table::{self, BALL_COUNT, CUE_BALL};

/// What the settle of a shot decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Shooter keeps the table.
    Continue,
    /// Turn passes cleanly.
    Pass,
    /// Turn passes and the next player gets ball in hand.
    Foul,
    GameWon { winner: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub outcome: Outcome,
    /// Group assignment that closes an open table, as the new colours bit.
    pub assign_colours: Option<u8>,
}

impl Verdict {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            assign_colours: None,
        }
    }
}

/// The table as the rules see it once the balls have stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotContext {
    pub turn: u8,
    pub colours: u8,
    pub open: bool,
    pub pocketed: PocketMask,
    pub pre_shot: PocketMask,
    pub first_contact: Option<usize>,
    pub made_point: bool,
    pub made_penalty: bool,
    pub carom: CaromScore,
}

impl ShotContext {
    pub fn from_table(table: &TableState) -> Self {
        Self {
            turn: table.game.turn & 1,
            colours: table.game.colours & 1,
            open: table.game.open,
            pocketed: table.pocketed,
            pre_shot: table.pre_shot_pocketed,
            first_contact: table.shot.first_contact,
            made_point: table.shot.made_point,
            made_penalty: table.shot.made_penalty,
            carom: table.carom,
        }
    }

    pub fn scratched(&self) -> bool {
        self.pocketed.contains(CUE_BALL)
    }

    /// Whether any ball in `mask` went down during this shot.
    pub fn sank_any(&self, mask: u16) -> bool {
        self.pocketed.intersection(mask) > self.pre_shot.intersection(mask)
    }
}

/// Shared precedence once a rule set has judged the shot.
pub(crate) struct Judgement {
    pub win: bool,
    pub foul: bool,
    pub deferred_loss: bool,
    pub objective: bool,
    pub opponent_sink: bool,
}

impl Judgement {
    pub fn resolve(&self, shooter: u8) -> Outcome {
        if self.win {
            let winner = if self.foul { shooter ^ 1 } else { shooter };
            Outcome::GameWon { winner }
        } else if self.deferred_loss {
            Outcome::GameWon { winner: shooter ^ 1 }
        } else if self.foul {
            Outcome::Foul
        } else if self.objective && !self.opponent_sink {
            Outcome::Continue
        } else {
            Outcome::Pass
        }
    }
}

pub trait RuleSet: Send + Sync {
    fn mode(&self) -> GameMode;

    /// Lays out the break. Returns the starting pocketed mask.
    fn rack(&self, balls: &mut [Ball; BALL_COUNT], rng: &mut ChaCha8Rng) -> PocketMask;

    /// Ball the shooter must strike first, if the mode has one.
    fn target_ball(&self, shot: &ShotContext) -> Option<usize>;

    fn is_wrong_first_contact(&self, shot: &ShotContext) -> bool;

    fn settle(&self, shot: &ShotContext) -> Verdict;
}

/// Fallback for modes without dedicated rules: sinking the cue ball is the only foul.
#[derive(Debug, Clone, Copy)]
pub struct Permissive {
    mode: GameMode,
}

impl RuleSet for Permissive {
    fn mode(&self) -> GameMode {
        self.mode
    }

    fn rack(&self, balls: &mut [Ball; BALL_COUNT], rng: &mut ChaCha8Rng) -> PocketMask {
        table::rack_triangle(balls, rng)
    }

    fn target_ball(&self, _shot: &ShotContext) -> Option<usize> {
        None
    }

    fn is_wrong_first_contact(&self, _shot: &ShotContext) -> bool {
        false
    }

    fn settle(&self, shot: &ShotContext) -> Verdict {
        let judgement = Judgement {
            win: false,
            foul: shot.scratched(),
            deferred_loss: false,
            objective: true,
            opponent_sink: false,
        };
        Verdict::new(judgement.resolve(shot.turn))
    }
}

pub fn for_mode(mode: GameMode) -> Box<dyn RuleSet> {
    match mode {
        GameMode::EightBall => Box::new(EightBall),
        GameMode::NineBall => Box::new(NineBall),
        GameMode::FourBall => Box::new(FourBall),
        GameMode::Unknown(_) => Box::new(Permissive { mode }),
    }
}
