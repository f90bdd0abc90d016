pub mod channel;
pub mod protocol;
mod stats;

pub use channel::{BroadcastChannel, Delivery, PeerId};
pub use protocol::{CodecError, RECORD_LEN, WireFlags, WireRecord};
pub use stats::{ChannelStats, PacketLossSimulation};
