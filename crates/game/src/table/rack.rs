use glam::Vec3;
use rand::Rng;

use super::{
    BALL_COUNT, CAROM_SPOT_X, FOOT_SPOT_X, RACK_JITTER, RACK_SPACING_X, RACK_SPACING_Y, head_spot,
};
use crate::state::{Ball, PocketMask};

const TRIANGLE_ORDER: [usize; 15] = [9, 2, 10, 11, 1, 3, 4, 12, 5, 13, 14, 6, 15, 7, 8];
const DIAMOND_ORDER: [usize; 9] = [2, 3, 4, 5, 9, 6, 7, 8, 1];
const DIAMOND_ROWS: [usize; 5] = [0, 1, 2, 1, 0];

fn jitter(rng: &mut impl Rng) -> f32 {
    rng.gen_range(-RACK_JITTER..=RACK_JITTER)
}

fn reset(balls: &mut [Ball; BALL_COUNT]) {
    for ball in balls.iter_mut() {
        ball.stop();
    }
}

fn rack_position(row: usize, lane: isize, rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        FOOT_SPOT_X + row as f32 * RACK_SPACING_Y + jitter(rng),
        0.0,
        lane as f32 * RACK_SPACING_X + jitter(rng),
    )
}

/// Fifteen object balls in a five-row triangle with the apex on the foot spot.
pub fn rack_triangle(balls: &mut [Ball; BALL_COUNT], rng: &mut impl Rng) -> PocketMask {
    reset(balls);
    balls[0].position = head_spot();

    let mut order = TRIANGLE_ORDER.iter();
    for row in 0..5 {
        for slot in 0..=row {
            if let Some(&id) = order.next() {
                let lane = 2 * slot as isize - row as isize;
                balls[id].position = rack_position(row, lane, rng);
            }
        }
    }

    PocketMask::EMPTY
}

/// Balls 1-9 in a diamond; 10-15 start in the tray.
pub fn rack_diamond(balls: &mut [Ball; BALL_COUNT], rng: &mut impl Rng) -> PocketMask {
    reset(balls);
    balls[0].position = head_spot();

    let mut order = DIAMOND_ORDER.iter();
    for (row, &width) in DIAMOND_ROWS.iter().enumerate() {
        for slot in 0..=width {
            if let Some(&id) = order.next() {
                let lane = 2 * slot as isize - width as isize;
                balls[id].position = rack_position(row, lane, rng);
            }
        }
    }

    PocketMask(0xFC00)
}

/// Two cue balls and two object balls on the centre line.
pub fn rack_carom(balls: &mut [Ball; BALL_COUNT]) -> PocketMask {
    reset(balls);
    balls[0].position = Vec3::new(-CAROM_SPOT_X, 0.0, 0.0);
    balls[9].position = Vec3::new(CAROM_SPOT_X, 0.0, 0.0);
    balls[2].position = Vec3::new(FOOT_SPOT_X, 0.0, 0.0);
    balls[3].position = Vec3::new(-FOOT_SPOT_X, 0.0, 0.0);

    PocketMask::CAROM
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::table::BALL_DIAMETER;

    fn no_overlaps(balls: &[Ball; BALL_COUNT], mask: PocketMask) {
        for a in 0..BALL_COUNT {
            for b in (a + 1)..BALL_COUNT {
                if mask.contains(a) || mask.contains(b) {
                    continue;
                }
                let dist = balls[a].position.distance(balls[b].position);
                assert!(dist > BALL_DIAMETER - 0.001, "balls {a} and {b} overlap");
            }
        }
    }

    #[test]
    fn triangle_places_every_ball() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut balls = [Ball::default(); BALL_COUNT];
        let mask = rack_triangle(&mut balls, &mut rng);

        assert_eq!(mask, PocketMask::EMPTY);
        assert!((balls[9].position.x - FOOT_SPOT_X).abs() < 0.001);
        assert!((balls[8].position.x - (FOOT_SPOT_X + 4.0 * RACK_SPACING_Y)).abs() < 0.001);
        no_overlaps(&balls, mask);
    }

    #[test]
    fn diamond_leaves_high_balls_pocketed() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut balls = [Ball::default(); BALL_COUNT];
        let mask = rack_diamond(&mut balls, &mut rng);

        assert!(mask.contains(10) && mask.contains(15));
        assert!(!mask.contains(9) && !mask.contains(1));
        assert!((balls[2].position.x - FOOT_SPOT_X).abs() < 0.001);
        assert!(balls[9].position.z.abs() < 0.001);
        no_overlaps(&balls, mask);
    }

    #[test]
    fn carom_layout_is_symmetric() {
        let mut balls = [Ball::default(); BALL_COUNT];
        balls[0].velocity = Vec3::X;
        let mask = rack_carom(&mut balls);

        assert_eq!(mask, PocketMask::CAROM);
        assert_eq!(balls[0].position.x, -balls[9].position.x);
        assert_eq!(balls[0].velocity, Vec3::ZERO);
    }
}
