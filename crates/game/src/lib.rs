pub mod event;
pub mod lobby;
pub mod net;
pub mod physics;
pub mod rules;
pub mod simulation;
pub mod state;
pub mod sync;
pub mod table;
pub mod view;

pub use event::{EventQueue, PeerEvent};
pub use lobby::{Lobby, LobbyError, LobbyMessage};
pub use net::{
    BroadcastChannel, ChannelStats, CodecError, Delivery, PacketLossSimulation, PeerId,
    WireRecord,
};
pub use physics::{PhysicsConfig, PhysicsEvent, PhysicsWorld};
pub use rules::{Outcome, RuleSet, Verdict};
pub use simulation::FixedTimestep;
pub use state::{GameMode, GameState, PocketMask, TableState, TimerMode, Transitions};
pub use sync::{MatchSettings, Outgoing, Peer, PeerConfig, Receipt, Shot, SyncError};
pub use view::TableView;
