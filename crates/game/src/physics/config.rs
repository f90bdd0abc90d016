use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Seconds per integration step.
    pub fixed_step: f32,
    /// Cap on the accumulated backlog so a long frame cannot trigger a burst of steps.
    pub max_accumulated: f32,
    pub slide_friction: f32,
    pub roll_friction: f32,
    pub gravity: f32,
    /// Contact-point speed below which a ball counts as rolling.
    pub rolling_threshold: f32,
    pub stop_linear: f32,
    pub stop_angular: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_step: 0.0125,
            max_accumulated: 0.1,
            slide_friction: 0.2,
            roll_friction: 0.01,
            gravity: 9.80665,
            rolling_threshold: 0.1,
            stop_linear: 0.01,
            stop_angular: 0.2,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.fixed_step <= 0.0 {
            return Err("fixed_step must be positive".into());
        }
        if self.max_accumulated < self.fixed_step {
            return Err("max_accumulated must cover at least one step".into());
        }
        if self.slide_friction < 0.0 || self.roll_friction < 0.0 {
            return Err("friction coefficients must be non-negative".into());
        }
        if self.gravity <= 0.0 {
            return Err("gravity must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(PhysicsConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_backlog_shorter_than_step() {
        let config = PhysicsConfig {
            max_accumulated: 0.001,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
