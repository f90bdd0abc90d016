use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::table::BALL_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Display only. Never sent over the wire.
    pub orientation: Quat,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Ball {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn stop(&mut self) {
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    pub fn is_at_rest(&self) -> bool {
        self.velocity == Vec3::ZERO && self.angular_velocity == Vec3::ZERO
    }
}

/// One bit per ball, bit 0 is the cue ball.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PocketMask(pub u16);

impl PocketMask {
    pub const EMPTY: Self = Self(0);
    /// Everything but the four carom balls.
    pub const CAROM: Self = Self(0xFDF2);

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, ball: usize) -> bool {
        ball < BALL_COUNT && self.0 & (1 << ball) != 0
    }

    pub fn insert(&mut self, ball: usize) {
        self.0 |= 1 << ball;
    }

    pub fn remove(&mut self, ball: usize) {
        self.0 &= !(1 << ball);
    }

    pub fn toggle(&mut self, ball: usize) {
        self.0 ^= 1 << ball;
    }

    pub fn intersection(self, mask: u16) -> u16 {
        self.0 & mask
    }

    pub fn count_in(self, mask: u16) -> u32 {
        (self.0 & mask).count_ones()
    }

    /// Ids of balls still on the table.
    pub fn on_table(self) -> impl Iterator<Item = usize> {
        (0..BALL_COUNT).filter(move |&id| !self.contains(id))
    }
}
