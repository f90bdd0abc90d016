use rand::Rng;
use serde::{Deserialize, Serialize};

/// Loss and latency applied to every delivery on a simulated channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PacketLossSimulation {
    pub enabled: bool,
    pub loss_percent: f32,
    pub min_latency_ms: u32,
    pub max_latency_ms: u32,
    pub jitter_ms: u32,
}

impl PacketLossSimulation {
    pub fn should_drop(&self, rng: &mut impl Rng) -> bool {
        if !self.enabled || self.loss_percent <= 0.0 {
            return false;
        }
        rng.gen_range(0.0..100.0) < self.loss_percent
    }

    pub fn delay_ms(&self, rng: &mut impl Rng) -> u32 {
        if !self.enabled || self.max_latency_ms == 0 {
            return 0;
        }
        let base = self.min_latency_ms;
        let range = self.max_latency_ms.saturating_sub(self.min_latency_ms);
        let spread = if range > 0 { rng.gen_range(0..=range) } else { 0 };
        let jitter = if self.jitter_ms > 0 {
            rng.gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        base + spread + jitter
    }

    /// Latency without the random part, for traffic that must stay ordered.
    pub fn base_delay_ms(&self) -> u32 {
        if self.enabled { self.min_latency_ms } else { 0 }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.loss_percent) {
            return Err("loss_percent must be within 0..=100".into());
        }
        if self.min_latency_ms > self.max_latency_ms {
            return Err("min_latency_ms must not exceed max_latency_ms".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub published: u64,
    pub rejected: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub resynced: u64,
    pub lobby_bytes: u64,
}

impl ChannelStats {
    pub fn loss_percent(&self) -> f32 {
        let attempted = self.delivered + self.dropped;
        if attempted == 0 {
            return 0.0;
        }
        self.dropped as f32 * 100.0 / attempted as f32
    }
}
