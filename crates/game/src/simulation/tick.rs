use crate::physics::PhysicsConfig;

/// Accumulates frame time and hands it out in fixed steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    max_accumulated: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32, max_accumulated: f32) -> Self {
        Self {
            dt,
            max_accumulated,
            accumulator: 0.0,
        }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.fixed_step, config.max_accumulated)
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// The backlog is capped as a whole, not per frame.
    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator = (self.accumulator + delta.max(0.0)).min(self.max_accumulated);
    }

    pub fn should_tick(&self) -> bool {
        self.accumulator >= self.dt
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }

    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
