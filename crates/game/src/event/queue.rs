use std::collections::VecDeque;

use super::types::PeerEvent;

/// Bounded FIFO of peer events. Cosmetic events are evicted first when full.
#[derive(Debug)]
pub struct EventQueue {
    pending: VecDeque<PeerEvent>,
    max_pending: usize,
}

impl EventQueue {
    pub fn new(max_pending: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(max_pending),
            max_pending,
        }
    }

    pub fn push(&mut self, event: PeerEvent) {
        if self.pending.len() >= self.max_pending && !self.evict_oldest_cosmetic() {
            if event.is_cosmetic() {
                return;
            }
            self.pending.pop_front();
        }
        self.pending.push_back(event);
    }

    pub fn drain(&mut self) -> Vec<PeerEvent> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn evict_oldest_cosmetic(&mut self) -> bool {
        if let Some(idx) = self.pending.iter().position(PeerEvent::is_cosmetic) {
            self.pending.remove(idx);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicsEvent;

    fn contact() -> PeerEvent {
        PeerEvent::Physics(PhysicsEvent::BallContact {
            a: 0,
            b: 1,
            strength: 1.0,
        })
    }

    #[test]
    fn drain_preserves_order() {
        let mut queue = EventQueue::new(8);
        queue.push(PeerEvent::ShotStarted);
        queue.push(PeerEvent::TimerExpired);

        assert_eq!(
            queue.drain(),
            vec![PeerEvent::ShotStarted, PeerEvent::TimerExpired]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn full_queue_drops_cosmetic_first() {
        let mut queue = EventQueue::new(2);
        queue.push(contact());
        queue.push(PeerEvent::ShotStarted);
        queue.push(PeerEvent::GameOver { winner: 1 });

        assert_eq!(
            queue.drain(),
            vec![PeerEvent::ShotStarted, PeerEvent::GameOver { winner: 1 }]
        );
    }

    #[test]
    fn full_queue_rejects_new_cosmetic_events() {
        let mut queue = EventQueue::new(1);
        queue.push(PeerEvent::SettingsChanged);
        queue.push(contact());
        assert_eq!(queue.drain(), vec![PeerEvent::SettingsChanged]);
    }
}
