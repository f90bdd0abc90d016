use crate::physics::PhysicsEvent;
use crate::rules::Outcome;
use crate::state::GameMode;

/// Things a peer reports to its presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeerEvent {
    NewGame { game_id: u16, mode: GameMode },
    TurnChanged { turn: u8, ours: bool },
    TableClosed { colours: u8 },
    GameOver { winner: u8 },
    SettingsChanged,
    ShotStarted,
    /// `outcome` is only known to the peer that simulated the shot.
    Settled { outcome: Option<Outcome> },
    BallInHand { max_x: f32 },
    TimerExpired,
    Physics(PhysicsEvent),
}

impl PeerEvent {
    /// Sound and effect cues that can be dropped under pressure.
    pub fn is_cosmetic(&self) -> bool {
        matches!(self, Self::Physics(_))
    }
}
