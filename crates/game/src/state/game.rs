use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    EightBall,
    NineBall,
    FourBall,
    /// A 3-bit mode value this build has no rules for. Kept so it round-trips.
    Unknown(u8),
}

impl GameMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x7 {
            0 => Self::EightBall,
            1 => Self::NineBall,
            2 => Self::FourBall,
            other => Self::Unknown(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::EightBall => 0,
            Self::NineBall => 1,
            Self::FourBall => 2,
            Self::Unknown(bits) => bits & 0x7,
        }
    }

    pub fn is_carom(self) -> bool {
        matches!(self, Self::FourBall)
    }

    /// Highest ball id that takes part in a rack of this mode.
    pub fn last_ball(self) -> usize {
        match self {
            Self::NineBall => 9,
            _ => 15,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerMode {
    #[default]
    Off,
    Sixty,
    Thirty,
}

impl TimerMode {
    /// `None` for the undefined value 3.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x3 {
            0 => Some(Self::Off),
            1 => Some(Self::Sixty),
            2 => Some(Self::Thirty),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Sixty => 1,
            Self::Thirty => 2,
        }
    }

    pub fn seconds(self) -> Option<f32> {
        match self {
            Self::Off => None,
            Self::Sixty => Some(60.0),
            Self::Thirty => Some(30.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaromRegion {
    /// Yotsudama: second and third distinct object contacts each score.
    #[default]
    Japanese,
    /// Sagu: touching the opponent's cue ball costs a point.
    Korean,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaromScore {
    pub scores: [u8; 2],
    pub region: CaromRegion,
}

impl CaromScore {
    pub const WINNING_SCORE: u8 = 10;

    pub fn award(&mut self, player: u8) {
        let score = &mut self.scores[usize::from(player & 1)];
        *score = (*score + 1).min(Self::WINNING_SCORE);
    }

    pub fn penalize(&mut self, player: u8) {
        let score = &mut self.scores[usize::from(player & 1)];
        *score = score.saturating_sub(1);
    }

    pub fn has_won(&self, player: u8) -> bool {
        self.scores[usize::from(player & 1)] >= Self::WINNING_SCORE
    }

    pub fn reset(&mut self) {
        self.scores = [0, 0];
    }
}

/// Turn and rule state. Bit packing lives in the codec only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub mode: GameMode,
    pub turn: u8,
    pub open: bool,
    pub colours: u8,
    pub foul: bool,
    pub game_over: bool,
    pub winner: u8,
    pub play_permitted: bool,
    pub timer: TimerMode,
    pub teams: bool,
    pub lobby_open: bool,
    pub simulating: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            mode: GameMode::EightBall,
            turn: 0,
            open: true,
            colours: 0,
            foul: false,
            game_over: true,
            winner: 0,
            play_permitted: false,
            timer: TimerMode::Off,
            teams: false,
            lobby_open: false,
            simulating: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_modes_keep_their_bits() {
        for bits in 0..8u8 {
            assert_eq!(GameMode::from_bits(bits).bits(), bits);
        }
        assert_eq!(GameMode::from_bits(5), GameMode::Unknown(5));
    }

    #[test]
    fn timer_value_three_is_undefined() {
        assert_eq!(TimerMode::from_bits(2), Some(TimerMode::Thirty));
        assert_eq!(TimerMode::from_bits(3), None);
        assert_eq!(TimerMode::Sixty.seconds(), Some(60.0));
    }

    #[test]
    fn carom_score_is_capped_and_floored() {
        let mut carom = CaromScore::default();
        carom.penalize(0);
        assert_eq!(carom.scores[0], 0);

        for _ in 0..12 {
            carom.award(1);
        }
        assert_eq!(carom.scores[1], CaromScore::WINNING_SCORE);
        assert!(carom.has_won(1));
        assert!(!carom.has_won(0));
    }
}
