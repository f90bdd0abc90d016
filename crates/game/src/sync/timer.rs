/// Countdown for the player at the table.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurnTimer {
    remaining: Option<f32>,
}

impl TurnTimer {
    pub fn start(&mut self, seconds: f32) {
        self.remaining = Some(seconds);
    }

    pub fn stop(&mut self) {
        self.remaining = None;
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Returns `true` once, on the tick the countdown runs out.
    pub fn tick(&mut self, delta: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= delta;
        if *remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_once() {
        let mut timer = TurnTimer::default();
        assert!(!timer.tick(1.0));

        timer.start(1.0);
        assert!(!timer.tick(0.5));
        assert!(timer.tick(0.5));
        assert!(!timer.is_running());
        assert!(!timer.tick(0.5));
    }
}
