/// One lobby byte: message id in bits 4-6, payload in bits 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobbyMessage {
    Join { seat: u8 },
    /// Seat 0 leaving resets the lobby.
    Leave { seat: u8 },
    /// Ready bit per seat, sent by the leader to a new arrival.
    NewJoinerCatchup { ready: u8 },
    MenuLocation(u8),
    ColourSet(u8),
    GameMode(u8),
    TimeLimit(u8),
    Teams(bool),
}

impl LobbyMessage {
    const JOIN: u8 = 0x00;
    const LEAVE: u8 = 0x10;
    const NEW_JOINER: u8 = 0x20;
    const MENU_LOCATION: u8 = 0x30;
    const COLOUR: u8 = 0x40;
    const GAME_MODE: u8 = 0x50;
    const TIME_LIMIT: u8 = 0x60;
    const TEAMS: u8 = 0x70;

    pub fn to_byte(self) -> u8 {
        match self {
            Self::Join { seat } => Self::JOIN | (seat & 0x3),
            Self::Leave { seat } => Self::LEAVE | (seat & 0x3),
            Self::NewJoinerCatchup { ready } => Self::NEW_JOINER | (ready & 0xF),
            Self::MenuLocation(location) => Self::MENU_LOCATION | (location & 0xF),
            Self::ColourSet(colour) => Self::COLOUR | (colour & 0x3),
            Self::GameMode(mode) => Self::GAME_MODE | (mode & 0x3),
            Self::TimeLimit(timer) => Self::TIME_LIMIT | (timer & 0x3),
            Self::Teams(teams) => Self::TEAMS | u8::from(teams),
        }
    }

    /// Every one of the 128 seven-bit values decodes to some message; bit 7 is ignored.
    pub fn from_byte(byte: u8) -> Self {
        let payload = byte & 0x0F;
        match byte & 0x70 {
            Self::JOIN => Self::Join {
                seat: payload & 0x3,
            },
            Self::LEAVE => Self::Leave {
                seat: payload & 0x3,
            },
            Self::NEW_JOINER => Self::NewJoinerCatchup { ready: payload },
            Self::MENU_LOCATION => Self::MenuLocation(payload),
            Self::COLOUR => Self::ColourSet(payload & 0x3),
            Self::GAME_MODE => Self::GameMode(payload & 0x3),
            Self::TIME_LIMIT => Self::TimeLimit(payload & 0x3),
            _ => Self::Teams(payload & 0x1 != 0),
        }
    }
}
