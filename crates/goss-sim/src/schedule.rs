//! Virtual time and the pending-delivery queue.
//!
//! Links never call into their target directly when they have a delay.
//! Instead an accepted send becomes a [`PendingDelivery`] due at
//! `now + delay`, and the simulation drains due entries at each tick.

use crate::link::LinkId;
use crate::node::NodeId;
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

/// Point on the simulation's virtual clock, in milliseconds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub const fn saturating_add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A message accepted by a link and waiting out its transit delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDelivery {
    /// Earliest time the message may be merged
    pub at: SimTime,
    pub link: LinkId,
    pub target: NodeId,
    pub message: State,
}

/// Heap entry ordered by delivery time, then by enqueue order.
#[derive(Debug)]
struct QueuedDelivery {
    sequence: u64,
    delivery: PendingDelivery,
}

impl PartialEq for QueuedDelivery {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedDelivery {}

impl Ord for QueuedDelivery {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.delivery.at.cmp(&other.delivery.at) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // FIFO among deliveries due at the same instant
        self.sequence.cmp(&other.sequence)
    }
}

impl PartialOrd for QueuedDelivery {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-queue of in-flight messages.
#[derive(Debug, Default)]
pub struct DeliveryQueue {
    heap: BinaryHeap<Reverse<QueuedDelivery>>,
    next_sequence: u64,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a delivery. Deliveries cannot be cancelled once pushed.
    pub fn push(&mut self, delivery: PendingDelivery) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(QueuedDelivery { sequence, delivery }));
    }

    /// Pop the earliest delivery if it is due at or before `now`.
    pub fn pop_due(&mut self, now: SimTime) -> Option<PendingDelivery> {
        let due = self
            .heap
            .peek()
            .is_some_and(|Reverse(entry)| entry.delivery.at <= now);
        if !due {
            return None;
        }
        self.heap.pop().map(|Reverse(entry)| entry.delivery)
    }

    /// Time of the earliest pending delivery
    pub fn next_due(&self) -> Option<SimTime> {
        self.heap.peek().map(|Reverse(entry)| entry.delivery.at)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery(at: u64, version: u64) -> PendingDelivery {
        PendingDelivery {
            at: SimTime::from_millis(at),
            link: LinkId(0),
            target: NodeId(1),
            message: State::new(version, crate::state::DEFAULT_COLOR),
        }
    }

    #[test]
    fn pops_in_time_order() {
        let mut queue = DeliveryQueue::new();
        queue.push(delivery(300, 3));
        queue.push(delivery(100, 1));
        queue.push(delivery(200, 2));

        let now = SimTime::from_millis(1_000);
        let versions: Vec<u64> = std::iter::from_fn(|| queue.pop_due(now))
            .map(|d| d.message.version)
            .collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }

    #[test]
    fn same_instant_is_fifo() {
        let mut queue = DeliveryQueue::new();
        for version in 0..5 {
            queue.push(delivery(50, version));
        }

        let now = SimTime::from_millis(50);
        let versions: Vec<u64> = std::iter::from_fn(|| queue.pop_due(now))
            .map(|d| d.message.version)
            .collect();
        assert_eq!(versions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn holds_back_future_deliveries() {
        let mut queue = DeliveryQueue::new();
        queue.push(delivery(500, 1));

        assert!(queue.pop_due(SimTime::from_millis(499)).is_none());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(SimTime::from_millis(500)));

        assert!(queue.pop_due(SimTime::from_millis(500)).is_some());
        assert!(queue.is_empty());
    }

    #[test]
    fn sim_time_saturates() {
        let t = SimTime::from_millis(u64::MAX - 1).saturating_add_millis(10);
        assert_eq!(t.as_millis(), u64::MAX);
        assert_eq!(SimTime::from_millis(16).to_string(), "16ms");
    }
}
