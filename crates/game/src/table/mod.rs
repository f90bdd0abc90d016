mod rack;

pub use rack::{rack_carom, rack_diamond, rack_triangle};

use glam::Vec3;

pub const BALL_COUNT: usize = 16;
pub const CUE_BALL: usize = 0;
pub const MONEY_BALL: usize = 1;
pub const ROTATION_MONEY_BALL: usize = 9;

/// Balls in play on a carom table. Ball 9 is the second cue ball.
pub const CAROM_BALLS: [usize; 4] = [0, 2, 3, 9];
pub const CAROM_OPPONENT_CUE: usize = 9;

pub const TABLE_HALF_WIDTH: f32 = 1.0668;
pub const TABLE_HALF_HEIGHT: f32 = 0.6096;
pub const POCKET_RADIUS: f32 = 0.09;
pub const POCKET_DEPTH: f32 = 0.04;

pub const BALL_DIAMETER: f32 = 0.06;
pub const BALL_RADIUS: f32 = 0.03;
pub const BALL_INV_RADIUS: f32 = 1.0 / BALL_RADIUS;
pub const BALL_DIAMETER_SQ: f32 = BALL_DIAMETER * BALL_DIAMETER;
/// Slightly under the squared diameter so predicted contacts land just short of overlap.
pub const BALL_DIAMETER_SQ_EPS: f32 = 0.003598;

pub const RACK_SPACING_X: f32 = 0.03;
pub const RACK_SPACING_Y: f32 = 0.051_961_524;
pub const RACK_JITTER: f32 = 0.0001;
pub const FOOT_SPOT_X: f32 = 0.5334;
pub const CAROM_SPOT_X: f32 = 0.8001;

pub const TRAY_ANCHOR: Vec3 = Vec3::new(-0.9847, 0.0, 0.768);

/// Resting place of a pocketed ball given how many object balls were already down.
pub fn tray_slot(count: u32) -> Vec3 {
    TRAY_ANCHOR + Vec3::X * (count as f32 * BALL_DIAMETER)
}

/// Where the cue ball is placed for a break in the pocketed modes.
pub fn head_spot() -> Vec3 {
    Vec3::new(-FOOT_SPOT_X, 0.0, 0.0)
}

/// Clamp a requested ball-in-hand position to the playing surface.
///
/// `max_x` restricts placement to the kitchen after a break.
pub fn clamp_placement(position: Vec3, max_x: f32) -> Vec3 {
    Vec3::new(
        position.x.clamp(-TABLE_HALF_WIDTH, max_x.min(TABLE_HALF_WIDTH)),
        0.0,
        position.z.clamp(-TABLE_HALF_HEIGHT, TABLE_HALF_HEIGHT),
    )
}
