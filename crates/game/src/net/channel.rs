use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::stats::{ChannelStats, PacketLossSimulation};
use crate::sync::Outgoing;

pub type PeerId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Current text of the replicated value.
    Record(String),
    Lobby(u8),
}

#[derive(Debug)]
struct Delayed {
    release_ms: u64,
    order: u64,
    target: PeerId,
    version: u64,
    delivery: Delivery,
}

impl PartialEq for Delayed {
    fn eq(&self, other: &Self) -> bool {
        (self.release_ms, self.order) == (other.release_ms, other.order)
    }
}

impl Eq for Delayed {}

impl PartialOrd for Delayed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Delayed {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        (other.release_ms, other.order).cmp(&(self.release_ms, self.order))
    }
}

/// One replicated string value shared by a fixed set of peers, plus the lobby byte events.
///
/// Time is virtual and only moves through [`BroadcastChannel::advance`], so a run with the same
/// seed always delivers the same messages in the same order.
#[derive(Debug)]
pub struct BroadcastChannel {
    peers: usize,
    owner: Option<PeerId>,
    value: Option<String>,
    version: u64,
    /// Newest value version delivered to each peer.
    seen: Vec<u64>,
    simulation: PacketLossSimulation,
    rng: ChaCha8Rng,
    now_ms: u64,
    order: u64,
    queue: BinaryHeap<Delayed>,
    stats: ChannelStats,
}

impl BroadcastChannel {
    pub fn new(peers: usize, simulation: PacketLossSimulation, seed: u64) -> Self {
        Self {
            peers,
            owner: None,
            value: None,
            version: 0,
            seen: vec![0; peers],
            simulation,
            rng: ChaCha8Rng::seed_from_u64(seed),
            now_ms: 0,
            order: 0,
            queue: BinaryHeap::new(),
            stats: ChannelStats::default(),
        }
    }

    pub fn peers(&self) -> usize {
        self.peers
    }

    pub fn owner(&self) -> Option<PeerId> {
        self.owner
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    /// Whether nothing is still in flight.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Takes ownership for `peer`. Returns the peer that lost it.
    pub fn claim(&mut self, peer: PeerId) -> Option<PeerId> {
        let previous = self.owner.replace(peer);
        previous.filter(|&previous| previous != peer)
    }

    /// Sets the value and fans it out. Only the owner may write, and only a change is sent.
    pub fn publish(&mut self, peer: PeerId, text: String) -> bool {
        if self.owner != Some(peer) {
            log::debug!("peer {peer} published without ownership");
            self.stats.rejected += 1;
            return false;
        }
        if self.value.as_deref() == Some(text.as_str()) {
            return false;
        }

        self.version += 1;
        self.stats.published += 1;
        if let Some(seen) = self.seen.get_mut(peer) {
            *seen = self.version;
        }

        for target in (0..self.peers).filter(|&target| target != peer) {
            if self.simulation.should_drop(&mut self.rng) {
                self.stats.dropped += 1;
                continue;
            }
            let delay = self.simulation.delay_ms(&mut self.rng);
            self.schedule(target, delay, self.version, Delivery::Record(text.clone()));
        }
        self.value = Some(text);
        true
    }

    /// Routes a peer's outgoing request. Returns the peer that lost ownership, if any.
    pub fn submit(&mut self, peer: PeerId, outgoing: Outgoing) -> Option<PeerId> {
        match outgoing {
            Outgoing::ClaimOwnership => self.claim(peer),
            Outgoing::Publish(text) => {
                self.publish(peer, text);
                None
            }
        }
    }

    /// Lobby bytes reach every peer, the sender included, in send order.
    pub fn broadcast_lobby(&mut self, byte: u8) {
        self.stats.lobby_bytes += 1;
        let delay = self.simulation.base_delay_ms();
        for target in 0..self.peers {
            self.schedule(target, delay, 0, Delivery::Lobby(byte));
        }
    }

    /// Re-sends the current value to every peer that has not received it yet.
    pub fn resync(&mut self) {
        let Some(value) = self.value.clone() else {
            return;
        };
        for target in 0..self.peers {
            let pending = self.queue.iter().any(|delayed| {
                delayed.target == target && delayed.version == self.version
            });
            if self.seen[target] < self.version && !pending {
                let delay = self.simulation.delay_ms(&mut self.rng);
                self.schedule(target, delay, self.version, Delivery::Record(value.clone()));
                self.stats.resynced += 1;
            }
        }
    }

    pub fn advance(&mut self, delta_ms: u64) {
        self.now_ms += delta_ms;
    }

    /// Everything due by now, in release order.
    pub fn poll(&mut self) -> Vec<(PeerId, Delivery)> {
        let mut due = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|delayed| delayed.release_ms <= self.now_ms)
        {
            let Some(delayed) = self.queue.pop() else {
                break;
            };
            if delayed.version > 0 {
                let seen = &mut self.seen[delayed.target];
                *seen = (*seen).max(delayed.version);
                self.stats.delivered += 1;
            }
            due.push((delayed.target, delayed.delivery));
        }
        due
    }

    fn schedule(&mut self, target: PeerId, delay_ms: u32, version: u64, delivery: Delivery) {
        self.order += 1;
        self.queue.push(Delayed {
            release_ms: self.now_ms + u64::from(delay_ms),
            order: self.order,
            target,
            version,
            delivery,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lossless(peers: usize) -> BroadcastChannel {
        BroadcastChannel::new(peers, PacketLossSimulation::default(), 3)
    }

    #[test]
    fn only_the_owner_publishes() {
        let mut channel = lossless(3);
        assert!(!channel.publish(1, "a".into()));
        assert_eq!(channel.stats().rejected, 1);

        assert_eq!(channel.claim(1), None);
        assert!(channel.publish(1, "a".into()));
        assert_eq!(channel.claim(2), Some(1));
        assert!(!channel.publish(1, "b".into()));
    }

    #[test]
    fn unchanged_value_is_not_resent() {
        let mut channel = lossless(2);
        channel.claim(0);
        assert!(channel.publish(0, "a".into()));
        assert!(!channel.publish(0, "a".into()));

        let delivered = channel.poll();
        assert_eq!(delivered, vec![(1, Delivery::Record("a".into()))]);
    }

    #[test]
    fn latency_holds_deliveries_back() {
        let mut channel = BroadcastChannel::new(
            2,
            PacketLossSimulation {
                enabled: true,
                loss_percent: 0.0,
                min_latency_ms: 50,
                max_latency_ms: 50,
                jitter_ms: 0,
            },
            9,
        );
        channel.claim(0);
        channel.publish(0, "a".into());

        channel.advance(49);
        assert!(channel.poll().is_empty());
        channel.advance(1);
        assert_eq!(channel.poll().len(), 1);
        assert!(channel.is_idle());
    }

    #[test]
    fn resync_recovers_dropped_values() {
        let mut channel = BroadcastChannel::new(
            3,
            PacketLossSimulation {
                enabled: true,
                loss_percent: 100.0,
                ..Default::default()
            },
            5,
        );
        channel.claim(0);
        channel.publish(0, "a".into());
        assert!(channel.poll().is_empty());
        assert_eq!(channel.stats().dropped, 2);

        channel.resync();
        let mut targets: Vec<_> = channel.poll().into_iter().map(|(peer, _)| peer).collect();
        targets.sort_unstable();
        assert_eq!(targets, vec![1, 2]);

        channel.resync();
        assert!(channel.poll().is_empty());
    }

    #[test]
    fn lobby_bytes_reach_the_sender_in_order() {
        let mut channel = lossless(2);
        channel.broadcast_lobby(0x00);
        channel.broadcast_lobby(0x51);

        let delivered = channel.poll();
        let to_sender: Vec<_> = delivered
            .iter()
            .filter(|(peer, _)| *peer == 0)
            .map(|(_, delivery)| delivery.clone())
            .collect();
        assert_eq!(to_sender, vec![Delivery::Lobby(0x00), Delivery::Lobby(0x51)]);
        assert_eq!(delivered.len(), 4);
    }

    #[test]
    fn outgoing_requests_route_through_submit() {
        let mut channel = lossless(2);
        assert_eq!(channel.submit(1, Outgoing::ClaimOwnership), None);
        channel.submit(1, Outgoing::Publish("x".into()));
        assert_eq!(channel.value(), Some("x"));
        assert_eq!(channel.submit(0, Outgoing::ClaimOwnership), Some(1));
    }
}
