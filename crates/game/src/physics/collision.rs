use crate::state::{Ball, PocketMask};
use crate::table::{BALL_COUNT, BALL_DIAMETER, BALL_DIAMETER_SQ_EPS, CUE_BALL};

/// Equal-mass elastic contact between balls `a` and `b`.
///
/// Only the closing component along the centre line is exchanged. Returns the closing speed
/// when an impulse was applied.
pub(super) fn collide(balls: &mut [Ball; BALL_COUNT], a: usize, b: usize) -> Option<f32> {
    let delta = balls[b].position - balls[a].position;
    let dist = delta.length();
    if dist >= BALL_DIAMETER || dist <= f32::EPSILON {
        return None;
    }

    let normal = delta / dist;
    let closing = (balls[a].velocity - balls[b].velocity).dot(normal);
    if closing <= 0.0 {
        return None;
    }

    let impulse = normal * closing;
    balls[a].velocity -= impulse;
    balls[b].velocity += impulse;
    Some(closing)
}

/// Moves the cue ball straight to its first contact if that contact happens within this step.
///
/// Only balls ahead of the cue are considered. Returns `false` when the cue ball should be
/// advanced normally.
pub(super) fn predict_cue_contact(
    balls: &mut [Ball; BALL_COUNT],
    pocketed: PocketMask,
    dt: f32,
) -> bool {
    let cue = balls[CUE_BALL];
    let direction = cue.velocity.normalize_or_zero();
    if direction == glam::Vec3::ZERO {
        return false;
    }

    let mut nearest: Option<(f32, f32)> = None;
    for id in pocketed.on_table().filter(|&id| id != CUE_BALL) {
        let offset = balls[id].position - cue.position;
        let along = direction.dot(offset);
        if along <= 0.0 {
            continue;
        }

        let clearance = BALL_DIAMETER_SQ_EPS - offset.length_squared() + along * along;
        if clearance < 0.0 {
            continue;
        }

        if nearest.is_none_or(|(best, _)| along < best) {
            nearest = Some((along, clearance));
        }
    }

    let Some((along, clearance)) = nearest else {
        return false;
    };

    let reach = along - clearance.sqrt();
    if reach * reach < (cue.velocity * dt).length_squared() {
        balls[CUE_BALL].position += direction * reach;
        true
    } else {
        false
    }
}
