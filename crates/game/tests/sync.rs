use baize::net::PacketLossSimulation;
use baize::state::PocketMask;
use baize::table::{BALL_COUNT, CUE_BALL, POCKET_RADIUS, TABLE_HALF_HEIGHT, TABLE_HALF_WIDTH};
use baize::{
    BroadcastChannel, Delivery, GameMode, MatchSettings, Outcome, Peer, PeerConfig, PeerEvent,
    Receipt, Shot, TableState, WireRecord,
};
use glam::Vec3;

const FRAME: f32 = 1.0 / 60.0;
const FRAME_MS: u64 = 16;

struct Room {
    peers: Vec<Peer>,
    channel: BroadcastChannel,
    events: Vec<Vec<PeerEvent>>,
}

impl Room {
    fn new(count: usize, simulation: PacketLossSimulation) -> Self {
        let peers = (0..count)
            .map(|seat| {
                let mut peer = Peer::new(PeerConfig {
                    rng_seed: seat as u64 + 11,
                    ..Default::default()
                });
                peer.sit(seat as u8);
                peer
            })
            .collect();

        Self {
            peers,
            channel: BroadcastChannel::new(count, simulation, 42),
            events: vec![Vec::new(); count],
        }
    }

    fn flush(&mut self) {
        let mut displaced = Vec::new();
        for (id, peer) in self.peers.iter_mut().enumerate() {
            for outgoing in peer.drain_outgoing() {
                if let Some(lost) = self.channel.submit(id, outgoing) {
                    displaced.push(lost);
                }
            }
        }
        for lost in displaced {
            self.peers[lost].ownership_lost();
        }
    }

    fn frame(&mut self) {
        self.flush();
        self.channel.advance(FRAME_MS);
        for (target, delivery) in self.channel.poll() {
            if let Delivery::Record(text) = delivery {
                self.peers[target].receive(&text);
            }
        }
        for (id, peer) in self.peers.iter_mut().enumerate() {
            peer.update(FRAME);
            self.events[id].extend(peer.drain_events());
        }
        self.flush();
    }

    fn quiet(&self) -> bool {
        self.channel.is_idle()
            && self
                .peers
                .iter()
                .all(|peer| !peer.is_simulating() && !peer.has_pending_update())
    }

    fn run_until_quiet(&mut self) {
        for _ in 0..60 * 120 {
            self.frame();
            if self.quiet() {
                return;
            }
        }
        panic!("table never settled");
    }

    /// Pushes a hand-built table to everyone, as if a previous owner had published it.
    fn seed(&mut self, table: &TableState, clock: u16) {
        let text = WireRecord::encode(table, clock).to_text();
        for peer in &mut self.peers {
            assert!(matches!(peer.receive(&text), Receipt::Applied(_)));
        }
    }

    fn settled_outcome(&self, peer: usize) -> Option<Outcome> {
        self.events[peer].iter().rev().find_map(|event| match event {
            PeerEvent::Settled { outcome } => *outcome,
            _ => None,
        })
    }
}

fn running_table(mode: GameMode) -> TableState {
    let mut table = TableState::default();
    table.game.mode = mode;
    table.game.game_over = false;
    table.game.play_permitted = true;
    table.game_id = 1;

    for id in 1..BALL_COUNT {
        let (col, row) = ((id % 5) as f32, (id / 5) as f32);
        table.balls[id].position = Vec3::new(0.2 + 0.09 * col, 0.0, 0.1 + 0.09 * row);
    }
    table
}

fn assert_same_table(room: &Room) {
    let first = room.peers[0].table();
    for peer in &room.peers[1..] {
        let table = peer.table();
        assert_eq!(table.clock, first.clock);
        assert_eq!(table.pocketed, first.pocketed);
        assert_eq!(table.game, first.game);
        for id in 0..BALL_COUNT {
            let drift = table.balls[id].position.distance(first.balls[id].position);
            assert!(drift < 1e-4, "ball {id} drifted by {drift}");
        }
    }
}

#[test]
fn test_break_is_replicated() {
    let mut room = Room::new(2, PacketLossSimulation::default());
    room.peers[0]
        .start_new_game(MatchSettings::default())
        .unwrap();
    room.run_until_quiet();
    assert_eq!(room.peers[1].table().game_id, 1);

    room.peers[0]
        .take_shot(Shot::from_cue_strike(Vec3::X, 8.0, Vec3::ZERO))
        .unwrap();
    room.run_until_quiet();
    assert_same_table(&room);

    let table = room.peers[0].table();
    for id in 0..BALL_COUNT {
        let position = table.balls[id].position;
        if table.pocketed.contains(id) {
            assert!(position.z > TABLE_HALF_HEIGHT, "ball {id} pocketed on the cloth");
        } else {
            assert!(position.x.abs() <= TABLE_HALF_WIDTH + POCKET_RADIUS);
            assert!(position.z.abs() <= TABLE_HALF_HEIGHT + POCKET_RADIUS);
        }
    }

    let outcome = room.settled_outcome(0).expect("shooter judged the break");
    let low = table.pocketed.count_in(0x01FC);
    let high = table.pocketed.count_in(0xFE00);
    if !table.game.open {
        assert_eq!(outcome, Outcome::Continue);
        assert_ne!(low, high);
    }
    assert_eq!(room.settled_outcome(1), None);
}

#[test]
fn test_scratch_fouls_and_returns_the_cue() {
    let mut room = Room::new(2, PacketLossSimulation::default());
    let mut table = running_table(GameMode::EightBall);
    table.balls[CUE_BALL].position = Vec3::new(
        -(TABLE_HALF_WIDTH - 0.3),
        0.0,
        -(TABLE_HALF_HEIGHT - 0.3),
    );
    room.seed(&table, 10);

    let corner = Vec3::new(-1.0, 0.0, -1.0);
    room.peers[0]
        .take_shot(Shot::from_cue_strike(corner, 1.5, Vec3::ZERO))
        .unwrap();
    room.run_until_quiet();
    assert_same_table(&room);

    assert_eq!(room.settled_outcome(0), Some(Outcome::Foul));
    for peer in &room.peers {
        let table = peer.table();
        assert_eq!(table.game.turn, 1);
        assert!(table.game.foul);
        assert!(!table.is_pocketed(CUE_BALL));
        assert_eq!(table.cue().position, Vec3::ZERO);
        assert!(table.cue().is_at_rest());
    }
    assert_eq!(room.peers[0].ball_in_hand(), None);
    assert_eq!(room.peers[1].ball_in_hand(), Some(TABLE_HALF_WIDTH));
    assert!(room.peers[1].can_shoot());

    room.peers[1].place_ball(Vec3::new(-0.6, 0.0, 0.2)).unwrap();
    room.run_until_quiet();
    assert_same_table(&room);
    assert!(!room.peers[0].game().foul);
}

#[test]
fn test_rotation_must_hit_lowest_ball_first() {
    let mut room = Room::new(2, PacketLossSimulation::default());
    let mut table = running_table(GameMode::NineBall);
    table.pocketed = PocketMask(0xFC00 | 0x001C);
    for id in 2..=4 {
        table.balls[id].position = Vec3::new(-0.9 + 0.07 * id as f32, 0.0, 0.768);
    }
    table.balls[CUE_BALL].position = Vec3::new(-0.5, 0.0, 0.0);
    table.balls[6].position = Vec3::ZERO;
    table.balls[5].position = Vec3::new(0.3, 0.0, -0.4);
    table.balls[9].position = Vec3::new(-0.3, 0.0, 0.45);
    room.seed(&table, 4);
    assert_eq!(room.peers[0].target_ball(), Some(5));

    room.peers[0]
        .take_shot(Shot::from_cue_strike(Vec3::X, 2.0, Vec3::ZERO))
        .unwrap();
    room.run_until_quiet();

    assert_eq!(room.settled_outcome(0), Some(Outcome::Foul));
    assert_eq!(room.peers[1].game().turn, 1);
    assert_eq!(room.peers[1].ball_in_hand(), Some(TABLE_HALF_WIDTH));
}

#[test]
fn test_stale_record_changes_nothing() {
    let mut room = Room::new(2, PacketLossSimulation::default());
    let table = running_table(GameMode::EightBall);
    room.seed(&table, 20);

    let mut older = table.clone();
    older.balls[3].position = Vec3::new(-0.4, 0.0, -0.4);
    older.game.turn = 1;
    let text = WireRecord::encode(&older, 20).to_text();

    let before = room.peers[1].table().clone();
    assert_eq!(room.peers[1].receive(&text), Receipt::Stale);
    assert_eq!(room.peers[1].table(), &before);

    let text = WireRecord::encode(&older, 7).to_text();
    assert_eq!(room.peers[1].receive(&text), Receipt::Stale);
    assert_eq!(room.peers[1].table(), &before);
}

#[test]
fn test_carom_turn_swaps_cue_balls() {
    let mut room = Room::new(2, PacketLossSimulation::default());
    room.peers[0]
        .start_new_game(MatchSettings {
            mode: GameMode::FourBall,
            ..Default::default()
        })
        .unwrap();
    room.run_until_quiet();

    let before = room.peers[1].table().balls;
    room.peers[0]
        .take_shot(Shot::from_cue_strike(Vec3::X, 0.0, Vec3::ZERO))
        .unwrap();
    room.run_until_quiet();
    assert_same_table(&room);

    assert_eq!(room.settled_outcome(0), Some(Outcome::Pass));
    let table = room.peers[1].table();
    assert_eq!(table.pocketed, PocketMask::CAROM);
    assert!(table.balls[CUE_BALL].position.distance(before[9].position) < 1e-4);
    assert!(table.balls[9].position.distance(before[CUE_BALL].position) < 1e-4);
    assert!(room.peers[1].can_shoot());
}

#[test]
fn test_lossy_channel_converges() {
    let simulation = PacketLossSimulation {
        enabled: true,
        loss_percent: 30.0,
        min_latency_ms: 20,
        max_latency_ms: 120,
        jitter_ms: 15,
    };
    let mut room = Room::new(3, simulation);
    room.peers[0]
        .start_new_game(MatchSettings::default())
        .unwrap();
    room.run_until_quiet();
    room.peers[0]
        .take_shot(Shot::from_cue_strike(Vec3::X, 5.0, Vec3::ZERO))
        .unwrap();

    for _ in 0..60 * 60 {
        room.frame();
        if room.quiet() {
            room.channel.resync();
            room.frame();
            if room.quiet() {
                break;
            }
        }
    }
    room.channel.resync();
    room.run_until_quiet();
    assert_same_table(&room);
}
