use glam::{Quat, Vec3};

use super::PhysicsConfig;
use crate::state::Ball;
use crate::table::{BALL_INV_RADIUS, BALL_RADIUS};

const CONTACT_POINT: Vec3 = Vec3::new(0.0, -BALL_RADIUS, 0.0);

/// Applies one step of table friction. Returns whether the ball is still moving.
pub(super) fn apply(ball: &mut Ball, config: &PhysicsConfig) -> bool {
    let dt = config.fixed_step;
    let mut velocity = ball.velocity;
    let mut spin = ball.angular_velocity;

    let contact = velocity + CONTACT_POINT.cross(spin);
    let moving = if contact.length() <= config.rolling_threshold {
        velocity -= config.roll_friction * config.gravity * dt * velocity.normalize_or_zero();
        spin = Vec3::new(-velocity.z * BALL_INV_RADIUS, 0.0, velocity.x * BALL_INV_RADIUS);

        if velocity.length() < config.stop_linear && spin.length() < config.stop_angular {
            velocity = Vec3::ZERO;
            spin = Vec3::ZERO;
            false
        } else {
            true
        }
    } else {
        let slip = contact.normalize_or_zero();
        let spin_decay = -5.0 * config.slide_friction * config.gravity * BALL_INV_RADIUS * 0.5;
        spin += spin_decay * dt * Vec3::Y.cross(slip);
        velocity -= config.slide_friction * config.gravity * dt * slip;
        true
    };

    ball.velocity = velocity;
    ball.angular_velocity = spin;
    ball.orientation = (Quat::from_scaled_axis(spin * dt) * ball.orientation).normalize();

    moving
}
