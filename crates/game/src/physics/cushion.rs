use std::f32::consts::FRAC_1_SQRT_2;

use glam::{Quat, Vec3};

use crate::state::Ball;
use crate::table::{POCKET_RADIUS, TABLE_HALF_HEIGHT, TABLE_HALF_WIDTH};

const FRAC_1_SQRT_5: f32 = 0.447_213_6;

// Cushion nose contact angle.
const SIN_BITE: f32 = 0.280_788_33;
const COS_BITE: f32 = 0.959_769_7;

// Impulse coefficients for a 0.79 restitution cushion and a 0.03 m ball.
const NORMAL_LOSS: f32 = 1.729_097_9;
const SPIN_TO_NORMAL: f32 = 0.002_406_757;
const TANGENT_KEEP: f32 = 0.714_285_7;
const SPIN_TO_TANGENT: f32 = 0.008_571_429;
const SPIN_GAIN: f32 = 15.625;
const SLIP_TO_SPIN: f32 = 0.045_714_285;
const DRIVE_TO_SPIN: f32 = 0.054_602_174;

/// Rigid-body cushion impulse against a cushion whose inward normal is `normal`.
///
/// Balls already leaving the cushion are not touched.
pub(super) fn bounce(ball: &mut Ball, normal: Vec3) {
    if ball.velocity.dot(normal) > 0.0 {
        return;
    }

    let frame = Quat::from_rotation_y((-normal.z).atan2(-normal.x));
    let v = frame * ball.velocity;
    let w = frame * ball.angular_velocity;

    let dv = Vec3::new(
        -v.x * NORMAL_LOSS - SPIN_TO_NORMAL * w.z,
        0.0,
        TANGENT_KEEP * v.z + SPIN_TO_TANGENT * (w.x * SIN_BITE - w.y * COS_BITE) - v.z,
    );

    let slip_x = v.x * SIN_BITE + w.z;
    let slip_z = -v.z - w.y * COS_BITE + w.x * SIN_BITE;
    let k = slip_z * TANGENT_KEEP;
    let drive = v.x * COS_BITE;

    let dw = Vec3::new(
        k * SIN_BITE,
        k * COS_BITE,
        SPIN_GAIN * (-slip_x * SLIP_TO_SPIN + drive * DRIVE_TO_SPIN),
    );

    let back = frame.inverse();
    ball.velocity += back * dv;
    ball.angular_velocity += back * dw;
}

fn straight_edges(ball: &mut Ball) {
    let sx = ball.position.x.signum();
    let sz = ball.position.z.signum();

    if ball.position.x * sx > TABLE_HALF_WIDTH {
        ball.position.x = TABLE_HALF_WIDTH * sx;
        bounce(ball, Vec3::new(-sx, 0.0, 0.0));
    }

    if ball.position.z * sz > TABLE_HALF_HEIGHT {
        ball.position.z = TABLE_HALF_HEIGHT * sz;
        bounce(ball, Vec3::new(0.0, 0.0, -sz));
    }
}

/// Pocketless table: four straight cushions.
pub(super) fn carom_table(ball: &mut Ball) {
    straight_edges(ball);
}

/// Table with pockets. Near a pocket mouth the cushion is a pair of angled jaws.
pub(super) fn pocket_table(ball: &mut Ball) {
    let p = ball.position;
    let sx = p.x.signum();
    let sz = p.z.signum();
    let ax = p.x * sx;
    let az = p.z * sz;

    let near_mouth = az > TABLE_HALF_HEIGHT - POCKET_RADIUS
        && (ax > TABLE_HALF_WIDTH - POCKET_RADIUS || ax < POCKET_RADIUS);
    if !near_mouth {
        straight_edges(ball);
        return;
    }

    // Which jaw of the mouth the ball is against.
    let side = if az > ax - TABLE_HALF_WIDTH + TABLE_HALF_HEIGHT {
        1.0
    } else {
        -1.0
    };

    // Corner jaws run at 45 degrees, side jaws at a 2:1 slope.
    let (slope, norm) = if ax > TABLE_HALF_WIDTH * 0.5 {
        (1.0, FRAC_1_SQRT_2)
    } else {
        (-2.0_f32, FRAC_1_SQRT_5)
    };

    let d = sx * sz * slope;
    let k = (-(TABLE_HALF_WIDTH * slope.max(0.0))
        + POCKET_RADIUS * side * slope.abs()
        + TABLE_HALF_HEIGHT)
        * sz;
    let l = side * sz;

    if p.z * l > (p.x * d + k) * l {
        let normal = Vec3::new(sx * slope, 0.0, -sz) * side * norm;

        let x = (p.x * d + p.z - k) / (2.0 * d);
        ball.position.x = x;
        ball.position.z = x * d + k;

        bounce(ball, normal);
    }
}
