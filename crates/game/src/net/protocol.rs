use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use bitflags::bitflags;
use glam::Vec3;

use crate::state::{
    CaromRegion, CaromScore, GameMode, GameState, PocketMask, TableState, TimerMode,
};
use crate::table::CUE_BALL;

pub const RECORD_LEN: usize = 82;

pub const POSITION_RANGE: f32 = 2.5;
pub const VELOCITY_RANGE: f32 = 50.0;
pub const SPIN_RANGE: f32 = 500.0;

const QUANT_MAX: f32 = 32767.0;

/// Byte offsets into the record.
pub mod offset {
    pub const POSITIONS: usize = 0x00;
    pub const CUE_VELOCITY: usize = 0x40;
    pub const CUE_SPIN: usize = 0x44;
    pub const POCKETED: usize = 0x4A;
    pub const FLAGS: usize = 0x4C;
    pub const CLOCK: usize = 0x4E;
    pub const GAME_ID: usize = 0x50;
}

bitflags! {
    /// Single-bit members of the flags word. Mode and timer are multi-bit fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WireFlags: u16 {
        const SIMULATING = 1 << 0;
        const TURN = 1 << 1;
        const FOUL = 1 << 2;
        const OPEN = 1 << 3;
        const COLOURS = 1 << 4;
        const GAME_OVER = 1 << 5;
        const WINNER = 1 << 6;
        const PLAY_PERMITTED = 1 << 7;
        const LOBBY_OPEN = 1 << 11;
        const TEAMS = 1 << 15;
    }
}

const MODE_SHIFT: u16 = 8;
const MODE_MASK: u16 = 0x7 << MODE_SHIFT;
const TIMER_SHIFT: u16 = 13;
const TIMER_MASK: u16 = 0x3 << TIMER_SHIFT;

const SCORE_REGION_BIT: u16 = 1 << 8;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("record is {0} bytes, expected {RECORD_LEN}")]
    Length(usize),
    #[error("record text is not valid base64: {0}")]
    Text(#[from] base64::DecodeError),
}

#[inline]
pub fn encode_scalar(value: f32, range: f32) -> u16 {
    // Out-of-range values wrap instead of saturating.
    ((value / range) * QUANT_MAX + QUANT_MAX).round() as i32 as u16
}

#[inline]
pub fn decode_scalar(raw: u16, range: f32) -> f32 {
    ((raw as f32 - QUANT_MAX) / QUANT_MAX) * range
}

pub fn pack_flags(game: &GameState) -> u16 {
    let mut flags = WireFlags::empty();
    flags.set(WireFlags::SIMULATING, game.simulating);
    flags.set(WireFlags::TURN, game.turn & 1 == 1);
    flags.set(WireFlags::FOUL, game.foul);
    flags.set(WireFlags::OPEN, game.open);
    flags.set(WireFlags::COLOURS, game.colours & 1 == 1);
    flags.set(WireFlags::GAME_OVER, game.game_over);
    flags.set(WireFlags::WINNER, game.winner & 1 == 1);
    flags.set(WireFlags::PLAY_PERMITTED, game.play_permitted);
    flags.set(WireFlags::LOBBY_OPEN, game.lobby_open);
    flags.set(WireFlags::TEAMS, game.teams);

    flags.bits()
        | (u16::from(game.mode.bits()) << MODE_SHIFT)
        | (u16::from(game.timer.bits()) << TIMER_SHIFT)
}

pub fn unpack_flags(bits: u16) -> GameState {
    let flags = WireFlags::from_bits_truncate(bits);
    let timer_bits = ((bits & TIMER_MASK) >> TIMER_SHIFT) as u8;
    let timer = TimerMode::from_bits(timer_bits).unwrap_or_else(|| {
        log::warn!("record carries undefined timer value {timer_bits}, using 30s");
        TimerMode::Thirty
    });

    GameState {
        mode: GameMode::from_bits(((bits & MODE_MASK) >> MODE_SHIFT) as u8),
        turn: u8::from(flags.contains(WireFlags::TURN)),
        open: flags.contains(WireFlags::OPEN),
        colours: u8::from(flags.contains(WireFlags::COLOURS)),
        foul: flags.contains(WireFlags::FOUL),
        game_over: flags.contains(WireFlags::GAME_OVER),
        winner: u8::from(flags.contains(WireFlags::WINNER)),
        play_permitted: flags.contains(WireFlags::PLAY_PERMITTED),
        timer,
        teams: flags.contains(WireFlags::TEAMS),
        lobby_open: flags.contains(WireFlags::LOBBY_OPEN),
        simulating: flags.contains(WireFlags::SIMULATING),
    }
}

pub fn pack_score_word(carom: &CaromScore) -> u16 {
    let region = match carom.region {
        CaromRegion::Japanese => 0,
        CaromRegion::Korean => SCORE_REGION_BIT,
    };
    u16::from(carom.scores[0] & 0xF) | (u16::from(carom.scores[1] & 0xF) << 4) | region
}

pub fn unpack_score_word(word: u16) -> CaromScore {
    CaromScore {
        scores: [(word & 0xF) as u8, ((word >> 4) & 0xF) as u8],
        region: if word & SCORE_REGION_BIT != 0 {
            CaromRegion::Korean
        } else {
            CaromRegion::Japanese
        },
    }
}

/// The fixed 82-byte state record.
#[derive(Clone, PartialEq, Eq)]
pub struct WireRecord([u8; RECORD_LEN]);

impl Default for WireRecord {
    fn default() -> Self {
        Self([0; RECORD_LEN])
    }
}

impl fmt::Debug for WireRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireRecord")
            .field("clock", &self.clock())
            .field("game_id", &self.game_id())
            .field("flags", &format_args!("{:#06x}", self.flags()))
            .finish()
    }
}

impl WireRecord {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let bytes: [u8; RECORD_LEN] = bytes
            .try_into()
            .map_err(|_| CodecError::Length(bytes.len()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; RECORD_LEN] {
        &self.0
    }

    pub fn from_text(text: &str) -> Result<Self, CodecError> {
        let bytes = STANDARD.decode(text)?;
        Self::from_bytes(&bytes)
    }

    pub fn to_text(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn read_u16(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.0[offset], self.0[offset + 1]])
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) {
        self.0[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// x and z only.
    pub fn write_planar(&mut self, offset: usize, value: Vec3, range: f32) {
        self.write_u16(offset, encode_scalar(value.x, range));
        self.write_u16(offset + 2, encode_scalar(value.z, range));
    }

    pub fn read_planar(&self, offset: usize, range: f32) -> Vec3 {
        Vec3::new(
            decode_scalar(self.read_u16(offset), range),
            0.0,
            decode_scalar(self.read_u16(offset + 2), range),
        )
    }

    /// All three components, clamped to the range first.
    pub fn write_full(&mut self, offset: usize, value: Vec3, range: f32) {
        let value = value.clamp(Vec3::splat(-range), Vec3::splat(range));
        self.write_u16(offset, encode_scalar(value.x, range));
        self.write_u16(offset + 2, encode_scalar(value.y, range));
        self.write_u16(offset + 4, encode_scalar(value.z, range));
    }

    pub fn read_full(&self, offset: usize, range: f32) -> Vec3 {
        Vec3::new(
            decode_scalar(self.read_u16(offset), range),
            decode_scalar(self.read_u16(offset + 2), range),
            decode_scalar(self.read_u16(offset + 4), range),
        )
    }

    pub fn clock(&self) -> u16 {
        self.read_u16(offset::CLOCK)
    }

    pub fn game_id(&self) -> u16 {
        self.read_u16(offset::GAME_ID)
    }

    pub fn flags(&self) -> u16 {
        self.read_u16(offset::FLAGS)
    }

    /// Full encode of `state`, stamped with `clock`. Every byte is rewritten.
    pub fn encode(state: &TableState, clock: u16) -> Self {
        let mut record = Self::default();

        for (id, ball) in state.balls.iter().enumerate() {
            record.write_planar(offset::POSITIONS + id * 4, ball.position, POSITION_RANGE);
        }

        let cue = &state.balls[CUE_BALL];
        record.write_planar(offset::CUE_VELOCITY, cue.velocity, VELOCITY_RANGE);
        record.write_full(offset::CUE_SPIN, cue.angular_velocity, SPIN_RANGE);

        let word = if state.game.mode.is_carom() {
            pack_score_word(&state.carom)
        } else {
            state.pocketed.bits()
        };
        record.write_u16(offset::POCKETED, word);
        record.write_u16(offset::FLAGS, pack_flags(&state.game));
        record.write_u16(offset::CLOCK, clock);
        record.write_u16(offset::GAME_ID, state.game_id);

        record
    }

    /// Lobby-state encode. Rewrites flags, clock and game id and leaves the table bytes alone.
    pub fn encode_partial(&mut self, game: &GameState, clock: u16, game_id: u16) {
        let mut flags = WireFlags::GAME_OVER;
        flags.set(WireFlags::LOBBY_OPEN, game.lobby_open);
        flags.set(WireFlags::TEAMS, game.teams);

        let bits = flags.bits()
            | (u16::from(game.mode.bits()) << MODE_SHIFT)
            | (u16::from(game.timer.bits()) << TIMER_SHIFT);

        self.write_u16(offset::FLAGS, bits);
        self.write_u16(offset::CLOCK, clock);
        self.write_u16(offset::GAME_ID, game_id);
    }

    /// Overwrite `state` with the record contents. Sequence fencing is the caller's job.
    pub fn apply_to(&self, state: &mut TableState) {
        for (id, ball) in state.balls.iter_mut().enumerate() {
            ball.position = self.read_planar(offset::POSITIONS + id * 4, POSITION_RANGE);
            ball.stop();
        }

        let cue = &mut state.balls[CUE_BALL];
        cue.velocity = self.read_planar(offset::CUE_VELOCITY, VELOCITY_RANGE);
        cue.angular_velocity = self.read_full(offset::CUE_SPIN, SPIN_RANGE);

        state.game = unpack_flags(self.flags());

        let word = self.read_u16(offset::POCKETED);
        if state.game.mode.is_carom() {
            state.carom = unpack_score_word(word);
            state.pocketed = PocketMask::CAROM;
        } else {
            state.pocketed = PocketMask(word);
        }

        state.clock = self.clock();
        state.game_id = self.game_id();
    }
}
