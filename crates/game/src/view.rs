//! Read-only presentation data derived from a peer, for whatever draws the table.

use glam::{Quat, Vec3};

use crate::state::{GameState, PocketMask};
use crate::sync::Peer;
use crate::table::{BALL_COUNT, CUE_BALL, MONEY_BALL};

const LOW_GROUP: u16 = 0x01FC;
const HIGH_GROUP: u16 = 0xFE00;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallView {
    pub position: Vec3,
    pub orientation: Quat,
    pub pocketed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub balls: [BallView; BALL_COUNT],
    /// Carom points, or pocketed balls per team in the pocket modes.
    pub scores: [u8; 2],
    pub turn: u8,
    pub ours: bool,
    pub target_ball: Option<usize>,
    /// Cue ball position while it may be placed.
    pub ball_in_hand: Option<Vec3>,
    /// Ball-contact effects only fire while a shot runs.
    pub colliders_active: bool,
    pub timer_remaining: Option<f32>,
    pub winner: Option<u8>,
}

impl TableView {
    pub fn from_peer(peer: &Peer) -> Self {
        let table = peer.table();
        let game = &table.game;

        let balls = std::array::from_fn(|id| BallView {
            position: table.balls[id].position,
            orientation: table.balls[id].orientation,
            pocketed: table.pocketed.contains(id),
        });

        let scores = if game.mode.is_carom() {
            table.carom.scores
        } else {
            pocketed_scores(game, table.pocketed)
        };

        Self {
            balls,
            scores,
            turn: game.turn,
            ours: peer.is_my_turn(),
            target_ball: peer.target_ball(),
            ball_in_hand: peer
                .ball_in_hand()
                .map(|_| table.balls[CUE_BALL].position),
            colliders_active: game.simulating,
            timer_remaining: peer.timer_remaining(),
            winner: game.game_over.then_some(game.winner),
        }
    }
}

/// Group balls down per team; the money ball counts for the winner once the game is over.
pub fn pocketed_scores(game: &GameState, pocketed: PocketMask) -> [u8; 2] {
    let low_team = usize::from(game.colours & 1);
    let mut scores = [0u8; 2];
    scores[low_team] = pocketed.count_in(LOW_GROUP) as u8;
    scores[low_team ^ 1] = pocketed.count_in(HIGH_GROUP) as u8;

    if game.game_over && pocketed.contains(MONEY_BALL) {
        scores[usize::from(game.winner & 1)] += 1;
    }
    scores
}
