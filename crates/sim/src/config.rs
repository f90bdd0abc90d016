use baize::state::{CaromRegion, GameMode, TimerMode};
use baize::{PacketLossSimulation, PeerConfig};

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub peers: usize,
    pub mode: GameMode,
    pub timer: TimerMode,
    pub teams: bool,
    pub region: CaromRegion,
    pub games: u32,
    /// Shots per game before the table is reset.
    pub max_shots: u32,
    pub frame_ms: u64,
    /// Virtual time between anti-entropy passes over the channel.
    pub resync_interval_ms: u64,
    pub min_speed: f32,
    pub max_speed: f32,
    pub seed: u64,
    pub packet_loss: Option<PacketLossSimulation>,
    pub peer: PeerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            peers: 2,
            mode: GameMode::EightBall,
            timer: TimerMode::Off,
            teams: false,
            region: CaromRegion::Japanese,
            games: 1,
            max_shots: 200,
            frame_ms: 16,
            resync_interval_ms: 1000,
            min_speed: 2.0,
            max_speed: 9.0,
            seed: 1,
            packet_loss: None,
            peer: PeerConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.peers < 2 {
            return Err("at least two peers are needed for a match".into());
        }
        if self.teams && self.peers < 4 {
            return Err("team play needs four peers".into());
        }
        if self.frame_ms == 0 {
            return Err("frame_ms must be > 0".into());
        }
        if !(0.0..=self.max_speed).contains(&self.min_speed) {
            return Err("min_speed must be within 0..=max_speed".into());
        }
        if let Some(packet_loss) = &self.packet_loss {
            packet_loss.validate()?;
        }
        self.peer.validate()
    }

    /// Seats taken in the lobby. Anyone past them watches.
    pub fn seated(&self) -> usize {
        let seats = if self.teams { 4 } else { 2 };
        self.peers.min(seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn teams_need_four_peers() {
        let config = SimConfig {
            teams: true,
            peers: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(
            SimConfig {
                peers: 6,
                ..Default::default()
            }
            .seated(),
            2
        );
    }
}
