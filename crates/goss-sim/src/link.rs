//! Directed, delayed, rate-limited channels between nodes.

use crate::node::NodeId;
use crate::schedule::{DeliveryQueue, PendingDelivery, SimTime};
use crate::state::State;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a link in its topology's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link-{}", self.0)
    }
}

/// What happened to a message handed to [`Link::deliver`].
///
/// The sending node never looks at this; it is how the simulation routes
/// zero-delay messages and keeps counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Channel still cooling down from its previous send
    Dropped { ready_at: SimTime },
    /// Zero delay: merge into `target` right away
    Immediate { target: NodeId, message: State },
    /// Queued for merge at `at`
    Scheduled { at: SimTime },
}

/// One-way channel from `source` to `target`.
///
/// After accepting a send at time `t` the link ignores further sends until
/// `t + delay`. Accepted messages reach the target exactly `delay` later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    id: LinkId,
    source: NodeId,
    target: NodeId,
    delay_ms: u64,
    last_use: Option<SimTime>,
}

impl Link {
    pub fn new(id: LinkId, source: NodeId, target: NodeId, delay_ms: u64) -> Self {
        Self {
            id,
            source,
            target,
            delay_ms,
            last_use: None,
        }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    pub fn last_use(&self) -> Option<SimTime> {
        self.last_use
    }

    /// Earliest time the next send will be accepted. `None` if never used.
    pub fn ready_at(&self) -> Option<SimTime> {
        self.last_use
            .map(|last| last.saturating_add_millis(self.delay_ms))
    }

    /// Hand `message` to the channel at time `now`.
    ///
    /// Sends inside the cooldown window are dropped without side effects.
    pub fn deliver(
        &mut self,
        now: SimTime,
        message: State,
        queue: &mut DeliveryQueue,
    ) -> Delivery {
        if let Some(ready_at) = self.ready_at() {
            if now < ready_at {
                tracing::trace!(
                    link = %self.id,
                    now = %now,
                    ready_at = %ready_at,
                    "Link cooling down; dropping message"
                );
                return Delivery::Dropped { ready_at };
            }
        }

        self.last_use = Some(now);

        if self.delay_ms == 0 {
            return Delivery::Immediate {
                target: self.target,
                message,
            };
        }

        let at = now.saturating_add_millis(self.delay_ms);
        queue.push(PendingDelivery {
            at,
            link: self.id,
            target: self.target,
            message,
        });
        Delivery::Scheduled { at }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(delay_ms: u64) -> Link {
        Link::new(LinkId(0), NodeId(0), NodeId(1), delay_ms)
    }

    fn at(ms: u64) -> SimTime {
        SimTime::from_millis(ms)
    }

    #[test]
    fn first_send_is_always_accepted() {
        let mut queue = DeliveryQueue::new();
        let mut link = link(500);

        let outcome = link.deliver(SimTime::ZERO, State::seed(), &mut queue);
        assert_eq!(outcome, Delivery::Scheduled { at: at(500) });
        assert_eq!(link.last_use(), Some(SimTime::ZERO));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn send_inside_cooldown_is_dropped() {
        let mut queue = DeliveryQueue::new();
        let mut link = link(500);

        link.deliver(at(1_000), State::seed(), &mut queue);
        let outcome = link.deliver(at(1_499), State::seed(), &mut queue);

        assert_eq!(outcome, Delivery::Dropped { ready_at: at(1_500) });
        assert_eq!(link.last_use(), Some(at(1_000)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn send_at_cooldown_boundary_is_accepted() {
        let mut queue = DeliveryQueue::new();
        let mut link = link(500);

        link.deliver(at(1_000), State::seed(), &mut queue);
        let outcome = link.deliver(at(1_500), State::seed(), &mut queue);

        assert_eq!(outcome, Delivery::Scheduled { at: at(2_000) });
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn zero_delay_bypasses_queue() {
        let mut queue = DeliveryQueue::new();
        let mut link = link(0);

        for t in [0, 0, 1] {
            let outcome = link.deliver(at(t), State::seed(), &mut queue);
            assert_eq!(
                outcome,
                Delivery::Immediate {
                    target: NodeId(1),
                    message: State::seed()
                }
            );
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn accepted_sends_land_in_send_order() {
        let mut queue = DeliveryQueue::new();
        let mut link = link(400);

        for (t, version) in [(0, 1), (400, 2), (800, 3)] {
            link.deliver(at(t), State::new(version, crate::state::SEED_COLOR), &mut queue);
        }

        let landed: Vec<u64> = std::iter::from_fn(|| queue.pop_due(at(10_000)))
            .map(|d| d.message.version)
            .collect();
        assert_eq!(landed, vec![1, 2, 3]);
    }
}
