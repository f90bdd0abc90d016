use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::table::BALL_INV_RADIUS;

pub const MAX_CUE_SPEED: f32 = 20.0;
const CUE_SPIN_SCALE: f32 = -50.0;

/// Initial cue-ball state for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub velocity: Vec3,
    pub spin: Vec3,
}

impl Shot {
    /// `hit_offset` is where the tip meets the ball, relative to the ball centre.
    pub fn from_cue_strike(direction: Vec3, speed: f32, hit_offset: Vec3) -> Self {
        let direction = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
        let speed = speed.clamp(0.0, MAX_CUE_SPEED);
        let momentum = direction * speed;
        let lever = hit_offset * BALL_INV_RADIUS;

        Self {
            velocity: momentum,
            spin: lever.cross(momentum) * CUE_SPIN_SCALE,
        }
    }
}
