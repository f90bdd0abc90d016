use anyhow::{Result, bail};

use baize::{
    BroadcastChannel, ChannelStats, Delivery, Lobby, MatchSettings, Peer, PeerEvent, TableView,
};

use crate::bot::ShotBot;
use crate::config::SimConfig;

const FRAME_LIMIT: u64 = 60 * 60 * 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct GameReport {
    pub game_id: u16,
    pub shots: u32,
    pub winner: Option<u8>,
    pub scores: [u8; 2],
}

/// Every peer of one table, wired to a shared simulated channel.
pub struct Room {
    config: SimConfig,
    peers: Vec<Peer>,
    lobbies: Vec<Lobby>,
    channel: BroadcastChannel,
    bot: ShotBot,
    since_resync_ms: u64,
    frames: u64,
}

impl Room {
    pub fn new(config: SimConfig) -> Self {
        let peers = (0..config.peers)
            .map(|id| {
                let mut peer_config = config.peer.clone();
                peer_config.rng_seed = config.seed.wrapping_add(id as u64);
                Peer::new(peer_config)
            })
            .collect();

        Self {
            lobbies: vec![Lobby::new(); config.peers],
            channel: BroadcastChannel::new(
                config.peers,
                config.packet_loss.clone().unwrap_or_default(),
                config.seed,
            ),
            bot: ShotBot::new(config.seed, config.min_speed, config.max_speed),
            since_resync_ms: 0,
            frames: 0,
            peers,
            config,
        }
    }

    pub fn stats(&self) -> &ChannelStats {
        self.channel.stats()
    }

    /// Seats everyone through the lobby and agrees on the match settings.
    pub fn assemble(&mut self) -> Result<()> {
        self.lobbies[0].join(0)?;
        self.settle_lobby();
        self.lobbies[0].set_menu_location(1)?;
        self.lobbies[0].set_teams(self.config.teams)?;
        self.lobbies[0].set_time_limit(self.config.timer)?;
        self.lobbies[0].set_game_mode(self.config.mode)?;
        self.lobbies[0].set_region(self.config.region)?;
        self.settle_lobby();

        for id in 1..self.config.seated() {
            self.lobbies[0].catch_up()?;
            self.settle_lobby();
            self.lobbies[id].join(id as u8)?;
            self.settle_lobby();
        }

        for (peer, lobby) in self.peers.iter_mut().zip(&self.lobbies) {
            match lobby.local_seat() {
                Some(seat) => peer.sit(seat),
                None => peer.stand(),
            }
        }

        if !self.lobbies[0].can_start() {
            bail!("lobby could not seat both teams");
        }
        log::info!(
            "lobby ready: {:?}, {} seated",
            self.lobbies[0].mode(),
            self.lobbies[0].ready_mask().count_ones()
        );
        Ok(())
    }

    /// Plays one game from the break until someone wins or the shot limit is reached.
    pub fn play_game(&mut self) -> Result<GameReport> {
        let settings = MatchSettings::from(&self.lobbies[0]);
        for lobby in &mut self.lobbies {
            lobby.set_game_running(true);
        }
        self.peers[0].start_new_game(settings)?;

        let mut report = GameReport::default();
        while report.shots < self.config.max_shots {
            self.run_until_quiet()?;
            self.resync_all()?;
            if self.peers[0].game().game_over {
                break;
            }

            let Some(shooter) = self.peers.iter().position(Peer::can_shoot) else {
                bail!("nobody can shoot on turn {}", self.peers[0].game().turn);
            };
            let peer = &mut self.peers[shooter];
            if !self.bot.place(peer) {
                self.run_until_quiet()?;
                continue;
            }
            let shot = self.bot.aim(peer);
            peer.take_shot(shot)?;
            report.shots += 1;
        }

        let finished = self.peers[0].game().game_over;
        if !finished {
            log::warn!("shot limit reached, resetting the table");
            self.peers[0].force_reset()?;
        }
        self.run_until_quiet()?;
        self.resync_all()?;

        let view = TableView::from_peer(&self.peers[0]);
        report.game_id = self.peers[0].table().game_id;
        report.winner = view.winner.filter(|_| finished);
        report.scores = view.scores;

        for lobby in &mut self.lobbies {
            lobby.set_game_running(false);
        }
        Ok(report)
    }

    /// Every peer holds the same table.
    pub fn converged(&self) -> bool {
        let first = self.peers[0].table();
        self.peers[1..].iter().all(|peer| {
            let table = peer.table();
            table.clock == first.clock && table.pocketed == first.pocketed && table.game == first.game
        })
    }

    fn settle_lobby(&mut self) {
        for _ in 0..64 {
            self.flush();
            if self.channel.is_idle() {
                return;
            }
            self.frame();
        }
    }

    fn run_until_quiet(&mut self) -> Result<()> {
        for _ in 0..FRAME_LIMIT {
            self.frame();
            if self.is_quiet() {
                return Ok(());
            }
        }
        bail!("table still busy after {} frames", self.frames)
    }

    /// Keeps resyncing until every peer caught up with a lossy channel.
    fn resync_all(&mut self) -> Result<()> {
        for _ in 0..32 {
            if self.converged() {
                return Ok(());
            }
            self.channel.resync();
            self.run_until_quiet()?;
        }
        bail!("peers never converged")
    }

    fn is_quiet(&self) -> bool {
        self.channel.is_idle()
            && self
                .peers
                .iter()
                .all(|peer| !peer.is_simulating() && !peer.has_pending_update())
    }

    fn frame(&mut self) {
        self.flush();
        self.channel.advance(self.config.frame_ms);
        self.frames += 1;

        self.since_resync_ms += self.config.frame_ms;
        if self.since_resync_ms >= self.config.resync_interval_ms {
            self.since_resync_ms = 0;
            self.channel.resync();
        }

        for (target, delivery) in self.channel.poll() {
            match delivery {
                Delivery::Record(text) => {
                    let receipt = self.peers[target].receive(&text);
                    log::trace!("peer {target}: {receipt:?}");
                }
                Delivery::Lobby(byte) => {
                    let message = self.lobbies[target].receive(byte);
                    log::trace!("peer {target} lobby: {message:?}");
                }
            }
        }

        let delta = self.config.frame_ms as f32 / 1000.0;
        for (id, peer) in self.peers.iter_mut().enumerate() {
            peer.update(delta);
            for event in peer.drain_events() {
                log_event(id, &event);
            }
        }
        self.flush();
    }

    fn flush(&mut self) {
        for lobby in &mut self.lobbies {
            for byte in lobby.drain_outgoing() {
                self.channel.broadcast_lobby(byte);
            }
        }

        let mut displaced = Vec::new();
        for (id, peer) in self.peers.iter_mut().enumerate() {
            for outgoing in peer.drain_outgoing() {
                displaced.extend(self.channel.submit(id, outgoing));
            }
        }
        for id in displaced {
            self.peers[id].ownership_lost();
        }
    }
}

fn log_event(peer: usize, event: &PeerEvent) {
    match event {
        PeerEvent::Physics(_) => {}
        PeerEvent::Settled { outcome: Some(outcome) } => {
            log::info!("peer {peer} judged the shot: {outcome:?}");
        }
        PeerEvent::GameOver { winner } if peer == 0 => {
            log::info!("team {winner} won");
        }
        PeerEvent::TurnChanged { turn, .. } if peer == 0 => {
            log::debug!("turn passed to team {turn}");
        }
        other => log::trace!("peer {peer}: {other:?}"),
    }
}
