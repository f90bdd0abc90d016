use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use baize::table::{BALL_RADIUS, TABLE_HALF_HEIGHT, TABLE_HALF_WIDTH};
use baize::{Peer, Shot};

const PLACEMENT_ATTEMPTS: usize = 16;

/// Picks shots for whichever peer is at the table. Aims straight at a ball and hits it.
pub struct ShotBot {
    rng: ChaCha8Rng,
    min_speed: f32,
    max_speed: f32,
}

impl ShotBot {
    pub fn new(seed: u64, min_speed: f32, max_speed: f32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            min_speed,
            max_speed,
        }
    }

    /// Places the cue ball somewhere legal. Gives up after a few obstructed tries.
    pub fn place(&mut self, peer: &mut Peer) -> bool {
        let Some(max_x) = peer.ball_in_hand() else {
            return true;
        };

        for _ in 0..PLACEMENT_ATTEMPTS {
            let position = Vec3::new(
                self.rng.gen_range(-TABLE_HALF_WIDTH..=max_x.min(TABLE_HALF_WIDTH)),
                0.0,
                self.rng.gen_range(-TABLE_HALF_HEIGHT..=TABLE_HALF_HEIGHT),
            );
            if peer.place_ball(position).is_ok() {
                return true;
            }
        }
        log::warn!("no free spot for the cue ball");
        false
    }

    pub fn aim(&mut self, peer: &Peer) -> Shot {
        let table = peer.table();
        let cue = table.cue().position;

        let target = peer.target_ball().or_else(|| {
            let last = table.game.mode.last_ball();
            let candidates: Vec<usize> = (1..=last).filter(|&id| !table.is_pocketed(id)).collect();
            (!candidates.is_empty()).then(|| candidates[self.rng.gen_range(0..candidates.len())])
        });

        let direction = match target {
            Some(id) => table.balls[id].position - cue,
            None => Vec3::new(self.rng.gen_range(-1.0..=1.0), 0.0, self.rng.gen_range(-1.0..=1.0)),
        };
        let speed = self.rng.gen_range(self.min_speed..=self.max_speed);
        let offset = Vec3::new(
            0.0,
            self.rng.gen_range(-0.5..=0.5) * BALL_RADIUS,
            self.rng.gen_range(-0.3..=0.3) * BALL_RADIUS,
        );

        log::debug!("aiming at {target:?} with {speed:.2} m/s");
        Shot::from_cue_strike(direction, speed, offset)
    }
}
