mod peer;
mod shot;
mod timer;

pub use peer::Peer;
pub use shot::{MAX_CUE_SPEED, Shot};
pub use timer::TurnTimer;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::PhysicsConfig;
use crate::state::{CaromRegion, GameMode, TimerMode, Transitions};

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerConfig {
    pub physics: PhysicsConfig,
    /// One seat plays both sides.
    pub practice: bool,
    pub rng_seed: u64,
    pub event_capacity: usize,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            practice: false,
            rng_seed: 0,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl PeerConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.physics.validate()?;
        if self.event_capacity == 0 {
            return Err("event_capacity must be > 0".into());
        }
        Ok(())
    }
}

/// What the next game is played as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSettings {
    pub mode: GameMode,
    pub timer: TimerMode,
    pub teams: bool,
    pub region: CaromRegion,
}

/// Requests a peer makes of the replicated channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    ClaimOwnership,
    Publish(String),
}

/// What `Peer::receive` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    Applied(Transitions),
    /// Latched until the running shot settles.
    Deferred,
    /// Same text as last time.
    Unchanged,
    Stale,
    Malformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("no seat at the table")]
    NotSeated,
    #[error("not this peer's turn")]
    NotYourTurn,
    #[error("play is not permitted right now")]
    PlayNotPermitted,
    #[error("a shot is still running")]
    Simulating,
    #[error("no ball in hand")]
    NoBallInHand,
    #[error("cue ball overlaps another ball")]
    CueBallObstructed,
    #[error("a game is in progress")]
    GameInProgress,
    #[error("only seated players can reset a running game")]
    NotAuthorized,
}
