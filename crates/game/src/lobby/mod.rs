mod message;

pub use message::LobbyMessage;

use thiserror::Error;

use crate::state::{CaromRegion, GameMode, TimerMode};
use crate::sync::MatchSettings;

pub const SEATS: usize = 4;

/// Highest selectable ball colour set. Set 3 is reserved for nine-ball.
const MAX_COLOUR: u8 = 2;
const ROTATION_COLOUR: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("cannot send lobby messages while a game is running")]
    GameRunning,
    #[error("lobby byte {0:#04x} does not fit in seven bits")]
    Oversized(u8),
    #[error("only the lobby leader can do that")]
    NotLeader,
    #[error("seat {0} is already taken")]
    SeatTaken(u8),
    #[error("already seated as {0}")]
    AlreadySeated(u8),
    #[error("not seated")]
    NotSeated,
    #[error("menu cannot move to location {0}")]
    InvalidMenuChange(u8),
}

/// Pre-game seating and settings, replicated through one-byte messages.
///
/// Every message is broadcast to all peers, the sender included; local state only changes when
/// the message comes back through [`Lobby::receive`]. The local seat is the exception.
#[derive(Debug, Clone, Default)]
pub struct Lobby {
    ready: [bool; SEATS],
    local_seat: Option<u8>,
    menu_location: u8,
    colour: u8,
    mode: u8,
    timer: u8,
    teams: bool,
    region: CaromRegion,
    game_running: bool,
    outbox: Vec<u8>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        let outbox = std::mem::take(&mut self.outbox);
        *self = Self {
            outbox,
            ..Self::default()
        };
    }

    pub fn local_seat(&self) -> Option<u8> {
        self.local_seat
    }

    pub fn is_leader(&self) -> bool {
        self.local_seat == Some(0)
    }

    pub fn ready(&self) -> [bool; SEATS] {
        self.ready
    }

    pub fn ready_mask(&self) -> u8 {
        self.ready
            .iter()
            .enumerate()
            .filter(|(_, ready)| **ready)
            .fold(0, |mask, (seat, _)| mask | 1 << seat)
    }

    pub fn seat_count(&self) -> usize {
        if self.teams { SEATS } else { 2 }
    }

    /// Both teams have someone seated.
    pub fn can_start(&self) -> bool {
        let mut teams = 0u8;
        for seat in 0..self.seat_count() {
            if self.ready[seat] {
                teams |= 1 << (seat & 1);
            }
        }
        self.is_leader() && teams == 0b11
    }

    pub fn menu_location(&self) -> u8 {
        self.menu_location
    }

    pub fn colour(&self) -> u8 {
        self.colour
    }

    pub fn mode(&self) -> GameMode {
        GameMode::from_bits(self.mode)
    }

    pub fn timer(&self) -> TimerMode {
        TimerMode::from_bits(self.timer).unwrap_or(TimerMode::Thirty)
    }

    pub fn teams(&self) -> bool {
        self.teams
    }

    pub fn is_game_running(&self) -> bool {
        self.game_running
    }

    pub fn set_game_running(&mut self, running: bool) {
        self.game_running = running;
    }

    /// Regional carom rule. Travels in the table record, not over the lobby bytes.
    pub fn set_region(&mut self, region: CaromRegion) -> Result<(), LobbyError> {
        self.require_leader()?;
        self.region = region;
        Ok(())
    }

    pub fn drain_outgoing(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbox)
    }

    /// Sit down, or stand up when `seat` is already ours.
    pub fn join(&mut self, seat: u8) -> Result<(), LobbyError> {
        let mut seat = seat & 3;

        if self.ready[usize::from(seat)] {
            if self.local_seat == Some(seat) {
                return self.leave();
            }
            log::error!("cannot join as {seat}: seat is taken");
            return Err(LobbyError::SeatTaken(seat));
        }
        if let Some(current) = self.local_seat {
            log::error!("cannot join as {seat}: already seated as {current}");
            return Err(LobbyError::AlreadySeated(current));
        }
        if !self.ready.contains(&true) && seat != 0 {
            log::warn!("first player at the table, taking seat 0");
            seat = 0;
        }

        self.send(LobbyMessage::Join { seat })?;
        self.local_seat = Some(seat);
        Ok(())
    }

    pub fn leave(&mut self) -> Result<(), LobbyError> {
        let Some(seat) = self.local_seat else {
            return Err(LobbyError::NotSeated);
        };
        self.send(LobbyMessage::Leave { seat })?;
        self.local_seat = None;
        Ok(())
    }

    /// Only the move from the start screen (0) to the main menu (1) exists.
    pub fn set_menu_location(&mut self, location: u8) -> Result<(), LobbyError> {
        self.require_leader()?;
        if location != 1 {
            log::error!("menu transition to {location} is not implemented");
            return Err(LobbyError::InvalidMenuChange(location));
        }
        self.send(LobbyMessage::MenuLocation(location))
    }

    pub fn cycle_colour(&mut self, step: i8) -> Result<(), LobbyError> {
        self.require_leader()?;
        let next = i16::from(self.colour) + i16::from(step);
        let colour = if next < 0 {
            MAX_COLOUR
        } else if next > i16::from(MAX_COLOUR) {
            0
        } else {
            next as u8
        };
        self.send(LobbyMessage::ColourSet(colour))
    }

    pub fn set_teams(&mut self, teams: bool) -> Result<(), LobbyError> {
        self.require_leader()?;
        self.send(LobbyMessage::Teams(teams))
    }

    pub fn set_time_limit(&mut self, timer: TimerMode) -> Result<(), LobbyError> {
        self.require_leader()?;
        self.send(LobbyMessage::TimeLimit(timer.bits()))
    }

    /// Nine-ball uses its own colour set, so switching in or out of it also resends the colour.
    pub fn set_game_mode(&mut self, mode: GameMode) -> Result<(), LobbyError> {
        self.require_leader()?;
        let bits = mode.bits() & 0x3;

        if mode == GameMode::NineBall {
            self.send(LobbyMessage::ColourSet(ROTATION_COLOUR))?;
        } else if self.mode() == GameMode::NineBall {
            self.send(LobbyMessage::ColourSet(0))?;
        }
        self.send(LobbyMessage::GameMode(bits))
    }

    /// Brings a newly arrived peer up to date. Only the leader answers.
    pub fn catch_up(&mut self) -> Result<(), LobbyError> {
        if !self.is_leader() {
            return Ok(());
        }
        self.send(LobbyMessage::NewJoinerCatchup {
            ready: self.ready_mask(),
        })?;
        self.send(LobbyMessage::MenuLocation(self.menu_location))?;
        self.send(LobbyMessage::ColourSet(self.colour))?;
        self.send(LobbyMessage::Teams(self.teams))?;
        self.send(LobbyMessage::TimeLimit(self.timer))?;
        self.send(LobbyMessage::GameMode(self.mode))
    }

    fn require_leader(&self) -> Result<(), LobbyError> {
        if self.is_leader() {
            Ok(())
        } else {
            log::error!("lobby change rejected: not the lobby leader");
            Err(LobbyError::NotLeader)
        }
    }

    pub fn send(&mut self, message: LobbyMessage) -> Result<(), LobbyError> {
        self.send_byte(message.to_byte())
    }

    pub fn send_byte(&mut self, byte: u8) -> Result<(), LobbyError> {
        if self.game_running {
            log::error!("tried to send lobby byte {byte:#04x} while the game is running");
            return Err(LobbyError::GameRunning);
        }
        if byte & 0x80 != 0 {
            log::error!("tried to send more than seven bits: {byte:#04x}");
            return Err(LobbyError::Oversized(byte));
        }
        self.outbox.push(byte);
        Ok(())
    }

    /// Applies a broadcast byte. The high bit is ignored.
    pub fn receive(&mut self, byte: u8) -> LobbyMessage {
        let message = LobbyMessage::from_byte(byte);

        match message {
            LobbyMessage::Join { seat } => self.ready[usize::from(seat)] = true,
            LobbyMessage::Leave { seat: 0 } => {
                log::info!("lobby leader left, resetting lobby");
                self.reset();
            }
            LobbyMessage::Leave { seat } => self.ready[usize::from(seat)] = false,
            LobbyMessage::NewJoinerCatchup { ready } => {
                for (seat, slot) in self.ready.iter_mut().enumerate() {
                    *slot = ready >> seat & 1 != 0;
                }
            }
            LobbyMessage::MenuLocation(location) => self.menu_location = location,
            LobbyMessage::ColourSet(colour) => self.colour = colour,
            LobbyMessage::GameMode(mode) => self.mode = mode,
            LobbyMessage::TimeLimit(3) => {
                log::error!("received undefined time limit 3, using 30 seconds");
                self.timer = TimerMode::Thirty.bits();
            }
            LobbyMessage::TimeLimit(timer) => self.timer = timer,
            LobbyMessage::Teams(teams) => {
                self.teams = teams;
                if let Some(seat) = self.local_seat.filter(|&seat| !teams && seat > 1) {
                    log::warn!("teams disabled, leaving seat {seat}");
                    if let Err(error) = self.send(LobbyMessage::Leave { seat }) {
                        log::warn!("could not announce leave: {error}");
                    }
                    self.local_seat = None;
                }
            }
        }

        message
    }
}

impl From<&Lobby> for MatchSettings {
    fn from(lobby: &Lobby) -> Self {
        Self {
            mode: lobby.mode(),
            timer: lobby.timer(),
            teams: lobby.teams,
            region: lobby.region,
        }
    }
}
