use bitflags::bitflags;

use super::{GameMode, TableState, TimerMode};

bitflags! {
    /// Edges detected between two decoded records.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Transitions: u8 {
        const NEW_GAME = 1 << 0;
        const TURN_CHANGED = 1 << 1;
        const TABLE_CLOSED = 1 << 2;
        const GAME_OVER = 1 << 3;
        const SETTINGS_CHANGED = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviousState {
    pub turn: u8,
    pub open: bool,
    pub game_over: bool,
    pub game_id: u16,
    pub mode: GameMode,
    pub timer: TimerMode,
    pub teams: bool,
    pub lobby_open: bool,
}

impl Default for PreviousState {
    fn default() -> Self {
        Self {
            turn: 0,
            open: true,
            game_over: true,
            game_id: 0,
            mode: GameMode::EightBall,
            timer: TimerMode::Off,
            teams: false,
            lobby_open: false,
        }
    }
}

impl PreviousState {
    pub fn capture(state: &TableState) -> Self {
        Self {
            turn: state.game.turn,
            open: state.game.open,
            game_over: state.game.game_over,
            game_id: state.game_id,
            mode: state.game.mode,
            timer: state.game.timer,
            teams: state.game.teams,
            lobby_open: state.game.lobby_open,
        }
    }

    pub fn diff(&self, state: &TableState) -> Transitions {
        let game = &state.game;
        let mut transitions = Transitions::empty();

        if state.game_id > self.game_id && !game.game_over {
            transitions |= Transitions::NEW_GAME;
        }
        if game.turn != self.turn {
            transitions |= Transitions::TURN_CHANGED;
        }
        if self.open && !game.open {
            transitions |= Transitions::TABLE_CLOSED;
        }
        if !self.game_over && game.game_over {
            transitions |= Transitions::GAME_OVER;
        }
        if game.mode != self.mode
            || game.timer != self.timer
            || game.teams != self.teams
            || game.lobby_open != self.lobby_open
        {
            transitions |= Transitions::SETTINGS_CHANGED;
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_new_game_and_turn() {
        let mut state = TableState::default();
        let previous = PreviousState::capture(&state);

        state.game_id = 1;
        state.game.game_over = false;
        state.game.turn = 1;

        let transitions = previous.diff(&state);
        assert!(transitions.contains(Transitions::NEW_GAME));
        assert!(transitions.contains(Transitions::TURN_CHANGED));
        assert!(!transitions.contains(Transitions::GAME_OVER));
    }

    #[test]
    fn new_game_needs_game_running() {
        let mut state = TableState::default();
        let previous = PreviousState::capture(&state);
        state.game_id = 4;
        assert!(!previous.diff(&state).contains(Transitions::NEW_GAME));
    }

    #[test]
    fn closing_and_ending_are_edges() {
        let mut state = TableState::default();
        state.game.game_over = false;
        let previous = PreviousState::capture(&state);

        state.game.open = false;
        state.game.game_over = true;
        let transitions = previous.diff(&state);
        assert_eq!(
            transitions,
            Transitions::TABLE_CLOSED | Transitions::GAME_OVER
        );

        let again = PreviousState::capture(&state).diff(&state);
        assert!(again.is_empty());
    }
}
