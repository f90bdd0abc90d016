use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{MatchSettings, Outgoing, PeerConfig, Receipt, Shot, SyncError, TurnTimer};
use crate::event::{EventQueue, PeerEvent};
use crate::net::protocol::WireRecord;
use crate::physics::{PhysicsEvent, PhysicsWorld};
use crate::rules::{self, Outcome, RuleSet, ShotContext, Verdict};
use crate::simulation::FixedTimestep;
use crate::state::{CaromScore, GameState, PreviousState, TableState, Transitions};
use crate::table::{self, CAROM_OPPONENT_CUE, CUE_BALL, FOOT_SPOT_X, TABLE_HALF_WIDTH};

/// One participant's view of the shared table.
///
/// Every mutation that other peers must see goes through `publish_full` or `publish_lobby`,
/// which pack the table, queue the text for the channel and then run the record back through
/// the same decode path a remote peer would use.
pub struct Peer {
    config: PeerConfig,
    table: TableState,
    world: PhysicsWorld,
    timestep: FixedTimestep,
    rules: Box<dyn RuleSet>,
    /// Last applied record. Lobby publishes patch it instead of re-encoding the table.
    record: WireRecord,
    seat: Option<u8>,
    armed: bool,
    /// Largest x the cue ball may be placed at.
    ball_in_hand: Option<f32>,
    simulated_by_us: bool,
    owner: bool,
    timer: TurnTimer,
    last_text: Option<String>,
    pending: Option<String>,
    outgoing: Vec<Outgoing>,
    events: EventQueue,
    physics_events: Vec<PhysicsEvent>,
    rng: ChaCha8Rng,
}

impl Peer {
    pub fn new(config: PeerConfig) -> Self {
        let table = TableState::default();
        let rules = rules::for_mode(table.game.mode);

        Self {
            world: PhysicsWorld::new(config.physics),
            timestep: FixedTimestep::from_config(&config.physics),
            events: EventQueue::new(config.event_capacity),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            record: WireRecord::default(),
            seat: None,
            armed: false,
            ball_in_hand: None,
            simulated_by_us: false,
            owner: false,
            timer: TurnTimer::default(),
            last_text: None,
            pending: None,
            outgoing: Vec::new(),
            physics_events: Vec::new(),
            config,
            table,
            rules,
        }
    }

    pub fn config(&self) -> &PeerConfig {
        &self.config
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn game(&self) -> &GameState {
        &self.table.game
    }

    pub fn rules(&self) -> &dyn RuleSet {
        self.rules.as_ref()
    }

    pub fn seat(&self) -> Option<u8> {
        self.seat
    }

    pub fn team(&self) -> Option<u8> {
        self.seat.map(|seat| seat & 1)
    }

    pub fn sit(&mut self, seat: u8) {
        self.seat = Some(seat & 3);
        let game = &self.table.game;
        self.armed = game.play_permitted && !game.game_over && self.is_my_turn();
    }

    pub fn stand(&mut self) {
        self.seat = None;
        self.armed = false;
        self.ball_in_hand = None;
    }

    pub fn is_my_turn(&self) -> bool {
        match self.seat {
            Some(seat) => self.config.practice || seat & 1 == self.table.game.turn & 1,
            None => false,
        }
    }

    /// Armed to strike: our turn and play permitted.
    pub fn can_shoot(&self) -> bool {
        self.armed
    }

    pub fn ball_in_hand(&self) -> Option<f32> {
        self.ball_in_hand
    }

    pub fn is_owner(&self) -> bool {
        self.owner
    }

    pub fn is_simulating(&self) -> bool {
        self.table.game.simulating
    }

    pub fn has_pending_update(&self) -> bool {
        self.pending.is_some()
    }

    pub fn timer_remaining(&self) -> Option<f32> {
        self.timer.remaining()
    }

    pub fn target_ball(&self) -> Option<usize> {
        if self.table.game.game_over {
            return None;
        }
        self.rules.target_ball(&ShotContext::from_table(&self.table))
    }

    pub fn settings(&self) -> MatchSettings {
        MatchSettings {
            mode: self.table.game.mode,
            timer: self.table.game.timer,
            teams: self.table.game.teams,
            region: self.table.carom.region,
        }
    }

    /// Called when another peer took ownership of the channel value.
    pub fn ownership_lost(&mut self) {
        self.owner = false;
    }

    pub fn drain_outgoing(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outgoing)
    }

    pub fn drain_events(&mut self) -> Vec<PeerEvent> {
        self.events.drain()
    }

    pub fn take_shot(&mut self, shot: Shot) -> Result<(), SyncError> {
        self.ensure_turn()?;
        if self.ball_in_hand.is_some() && self.table.cue_is_obstructed() {
            return Err(self.reject(SyncError::CueBallObstructed));
        }

        let turn = self.table.game.turn;
        let cue = &mut self.table.balls[CUE_BALL];
        cue.velocity = shot.velocity;
        cue.angular_velocity = shot.spin;

        self.ball_in_hand = None;
        self.armed = false;
        let game = &mut self.table.game;
        game.play_permitted = false;
        game.foul = false;
        game.simulating = true;

        self.begin_shot();
        self.publish_full(turn);
        self.simulated_by_us = true;
        log::debug!("team {} struck at {:.2} m/s", turn, shot.velocity.length());
        Ok(())
    }

    pub fn place_ball(&mut self, position: Vec3) -> Result<(), SyncError> {
        self.ensure_turn()?;
        let Some(max_x) = self.ball_in_hand else {
            return Err(self.reject(SyncError::NoBallInHand));
        };

        let placed = table::clamp_placement(position, max_x);
        let previous = self.table.balls[CUE_BALL].position;
        self.table.balls[CUE_BALL].position = placed;
        if self.table.cue_is_obstructed() {
            self.table.balls[CUE_BALL].position = previous;
            return Err(self.reject(SyncError::CueBallObstructed));
        }

        self.table.balls[CUE_BALL].stop();
        self.table.game.foul = false;
        self.table.game.play_permitted = true;
        let turn = self.table.game.turn;
        self.publish_full(turn);
        Ok(())
    }

    pub fn start_new_game(&mut self, settings: MatchSettings) -> Result<(), SyncError> {
        if self.seat.is_none() {
            return Err(self.reject(SyncError::NotSeated));
        }
        if !self.table.game.game_over {
            return Err(self.reject(SyncError::GameInProgress));
        }

        let rules = rules::for_mode(settings.mode);
        self.table.game = GameState {
            mode: settings.mode,
            timer: settings.timer,
            teams: settings.teams,
            game_over: false,
            play_permitted: true,
            ..GameState::default()
        };
        self.table.carom = CaromScore {
            scores: [0, 0],
            region: settings.region,
        };
        self.table.pocketed = rules.rack(&mut self.table.balls, &mut self.rng);
        self.table.game_id = self.table.game_id.wrapping_add(1);
        self.rules = rules;

        self.publish_full(0);
        Ok(())
    }

    /// Ends the current game for everyone, outranking records already in flight.
    pub fn force_reset(&mut self) -> Result<(), SyncError> {
        if self.seat.is_none() && !self.table.game.game_over {
            return Err(self.reject(SyncError::NotAuthorized));
        }

        log::info!("resetting table");
        self.table.clock = self.table.clock.wrapping_add(2);
        self.table.stop_all();
        let game = &mut self.table.game;
        game.game_over = true;
        game.play_permitted = false;
        game.simulating = false;
        self.simulated_by_us = false;
        self.timestep.reset();

        let turn = self.table.game.turn;
        self.publish_full(turn);
        if let Some(text) = self.pending.take() {
            self.decode_text(&text);
        }
        Ok(())
    }

    pub fn open_lobby(&mut self) -> Result<(), SyncError> {
        self.publish_lobby(self.settings(), true)
    }

    pub fn close_lobby(&mut self) -> Result<(), SyncError> {
        self.publish_lobby(self.settings(), false)
    }

    /// Publishes lobby state between games. Only the flag word, clock and game id change.
    pub fn publish_lobby(&mut self, settings: MatchSettings, open: bool) -> Result<(), SyncError> {
        if !self.table.game.game_over {
            return Err(self.reject(SyncError::GameInProgress));
        }

        self.claim_ownership();
        let game = &mut self.table.game;
        game.mode = settings.mode;
        game.timer = settings.timer;
        game.teams = settings.teams;
        game.lobby_open = open;
        self.table.carom.region = settings.region;

        let clock = self.table.clock.wrapping_add(1);
        let mut record = if self.table.clock == 0 {
            WireRecord::encode(&self.table, clock)
        } else {
            self.record.clone()
        };
        record.encode_partial(&self.table.game, clock, self.table.game_id);
        self.publish(record);
        Ok(())
    }

    /// Advances physics and the turn timer by `delta` seconds of wall time.
    pub fn update(&mut self, delta: f32) {
        if self.table.game.simulating {
            self.timestep.accumulate(delta);
            while self.timestep.consume_tick() {
                let report = self.world.step(&mut self.table, &mut self.physics_events);
                for event in self.physics_events.drain(..) {
                    self.events.push(PeerEvent::Physics(event));
                }
                if report.settled() {
                    self.on_settled();
                    break;
                }
            }
        }

        if self.timer.tick(delta) {
            self.on_timer_expired();
        }
    }

    /// Handles a text value from the replicated channel.
    pub fn receive(&mut self, text: &str) -> Receipt {
        if self.last_text.as_deref() == Some(text) {
            return Receipt::Unchanged;
        }
        self.last_text = Some(text.to_owned());

        if self.table.game.simulating {
            log::debug!("shot running, deferring update");
            self.pending = Some(text.to_owned());
            return Receipt::Deferred;
        }
        self.decode_text(text)
    }

    fn reject(&self, error: SyncError) -> SyncError {
        log::warn!("rejected: {error}");
        error
    }

    fn ensure_turn(&self) -> Result<(), SyncError> {
        let game = &self.table.game;
        let error = if self.seat.is_none() {
            SyncError::NotSeated
        } else if game.simulating {
            SyncError::Simulating
        } else if game.game_over || !game.play_permitted {
            SyncError::PlayNotPermitted
        } else if !self.is_my_turn() {
            SyncError::NotYourTurn
        } else {
            return Ok(());
        };
        Err(self.reject(error))
    }

    fn claim_ownership(&mut self) {
        self.owner = true;
        self.outgoing.push(Outgoing::ClaimOwnership);
    }

    fn publish_full(&mut self, turn: u8) {
        self.claim_ownership();
        self.table.game.turn = turn & 1;

        let bump = self.seat.map_or(0, |seat| u16::from((seat & 2) >> 1));
        let clock = self.table.clock.wrapping_add(1 + bump);
        self.publish(WireRecord::encode(&self.table, clock));
    }

    fn publish(&mut self, record: WireRecord) {
        let text = record.to_text();
        self.last_text = Some(text.clone());
        self.outgoing.push(Outgoing::Publish(text));
        self.apply_record(record);
    }

    fn decode_text(&mut self, text: &str) -> Receipt {
        match WireRecord::from_text(text) {
            Ok(record) => self.apply_record(record),
            Err(error) => {
                log::debug!("discarding record: {error}");
                Receipt::Malformed
            }
        }
    }

    fn apply_record(&mut self, record: WireRecord) -> Receipt {
        if record.clock() <= self.table.clock {
            log::debug!(
                "discarding stale record {} (applied {})",
                record.clock(),
                self.table.clock
            );
            return Receipt::Stale;
        }

        // Edges are measured against the last applied record, not against local edits made
        // just before publishing.
        let was_simulating = self.table.game.simulating;
        record.apply_to(&mut self.table);
        self.record = record;

        let transitions = self.table.previous.diff(&self.table);
        self.table.previous = PreviousState::capture(&self.table);
        let new_game = transitions.contains(Transitions::NEW_GAME);

        if new_game {
            self.on_new_game();
        }
        if transitions.contains(Transitions::TURN_CHANGED) {
            self.on_turn_changed(new_game);
        }
        if transitions.contains(Transitions::TABLE_CLOSED) {
            self.events.push(PeerEvent::TableClosed {
                colours: self.table.game.colours,
            });
        }
        if transitions.contains(Transitions::SETTINGS_CHANGED) {
            if self.rules.mode() != self.table.game.mode {
                self.rules = rules::for_mode(self.table.game.mode);
            }
            self.events.push(PeerEvent::SettingsChanged);
        }
        if transitions.contains(Transitions::GAME_OVER) {
            self.on_game_over();
            return Receipt::Applied(transitions);
        }
        if self.table.game.game_over {
            self.armed = false;
            return Receipt::Applied(transitions);
        }

        if self.table.game.simulating && !was_simulating {
            self.begin_shot();
        }

        if self.table.game.play_permitted {
            self.armed = self.is_my_turn();
            if !self.table.game.foul {
                self.ball_in_hand = None;
            }
            if let Some(seconds) = self.table.game.timer.seconds() {
                if !self.timer.is_running() {
                    self.timer.start(seconds);
                }
            }
        } else {
            self.armed = false;
            self.table.shot.clear();
            self.timer.stop();
        }

        if new_game && self.is_my_turn() && !self.table.game.mode.is_carom() {
            self.grant_ball_in_hand(-FOOT_SPOT_X);
        }

        Receipt::Applied(transitions)
    }

    fn begin_shot(&mut self) {
        self.table.pre_shot_pocketed = self.table.pocketed;
        self.table.shot.clear();
        self.timestep.reset();
        self.events.push(PeerEvent::ShotStarted);
    }

    fn grant_ball_in_hand(&mut self, max_x: f32) {
        self.ball_in_hand = Some(max_x);
        self.events.push(PeerEvent::BallInHand { max_x });
    }

    fn on_new_game(&mut self) {
        self.rules = rules::for_mode(self.table.game.mode);
        self.timer.stop();
        self.simulated_by_us = false;
        self.ball_in_hand = None;

        log::info!(
            "game {} started: {:?}",
            self.table.game_id,
            self.table.game.mode
        );
        self.events.push(PeerEvent::NewGame {
            game_id: self.table.game_id,
            mode: self.table.game.mode,
        });
    }

    /// A fresh rack already has every ball where it belongs.
    fn on_turn_changed(&mut self, fresh_rack: bool) {
        let game = self.table.game;

        if !fresh_rack {
            if game.mode.is_carom() {
                let cue = self.table.balls[CUE_BALL].position;
                let opponent = self.table.balls[CAROM_OPPONENT_CUE].position;
                self.table.balls[CUE_BALL].position = opponent;
                self.table.balls[CAROM_OPPONENT_CUE].position = cue;
            } else if self.table.pocketed.contains(CUE_BALL) {
                let cue = &mut self.table.balls[CUE_BALL];
                cue.position = Vec3::ZERO;
                cue.stop();
                self.table.pocketed.remove(CUE_BALL);
            }
        }

        let ours = self.is_my_turn();
        self.ball_in_hand = None;
        if ours && game.foul && !game.game_over {
            self.grant_ball_in_hand(TABLE_HALF_WIDTH);
        }
        self.timer.stop();

        self.events.push(PeerEvent::TurnChanged {
            turn: game.turn,
            ours,
        });
    }

    fn on_game_over(&mut self) {
        self.armed = false;
        self.ball_in_hand = None;
        self.timer.stop();

        log::info!(
            "game {} over, team {} wins",
            self.table.game_id,
            self.table.game.winner
        );
        self.events.push(PeerEvent::GameOver {
            winner: self.table.game.winner,
        });
    }

    fn on_settled(&mut self) {
        self.table.game.simulating = false;
        self.timestep.reset();

        let verdict = std::mem::take(&mut self.simulated_by_us).then(|| self.judge());
        self.events.push(PeerEvent::Settled {
            outcome: verdict.map(|verdict| verdict.outcome),
        });
        if let Some(verdict) = verdict {
            self.publish_verdict(verdict);
        }

        if let Some(text) = self.pending.take() {
            self.decode_text(&text);
        }
    }

    fn judge(&self) -> Verdict {
        let shot = ShotContext::from_table(&self.table);
        let verdict = self.rules.settle(&shot);
        log::info!("team {} shot settled: {:?}", shot.turn, verdict.outcome);
        verdict
    }

    fn publish_verdict(&mut self, verdict: Verdict) {
        let game = &mut self.table.game;
        let turn = game.turn;

        let next_turn = match verdict.outcome {
            Outcome::GameWon { winner } => {
                game.game_over = true;
                game.winner = winner;
                turn
            }
            Outcome::Continue => {
                if let Some(colours) = verdict.assign_colours {
                    game.colours = colours;
                    game.open = false;
                }
                game.play_permitted = true;
                turn
            }
            Outcome::Pass => {
                game.play_permitted = true;
                turn ^ 1
            }
            Outcome::Foul => {
                game.foul = true;
                game.play_permitted = true;
                turn ^ 1
            }
        };

        self.publish_full(next_turn);
    }

    fn on_timer_expired(&mut self) {
        self.events.push(PeerEvent::TimerExpired);

        let game = self.table.game;
        if game.game_over || game.simulating {
            return;
        }

        if self.is_my_turn() && game.play_permitted {
            log::info!("turn timer ran out for team {}", game.turn);
            self.ball_in_hand = None;
            self.armed = false;
            self.table.game.foul = true;
            self.table.game.play_permitted = true;
            self.publish_full(game.turn ^ 1);
        } else {
            self.table.game.play_permitted = false;
            self.armed = false;
        }
    }
}
