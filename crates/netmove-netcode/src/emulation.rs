//! In-process network emulation
//!
//! A one-way link that delays, jitters, and drops datagrams. Driven by the
//! caller's clock and a seeded [`SimRng`], so a lossy run replays exactly.

use netmove_core::SimRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Conditions applied to every datagram crossing an [`EmulatedLink`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConditions {
    /// Base one-way delay
    pub latency_ms: u64,
    /// Extra delay drawn uniformly from `[0, jitter_ms]` per datagram
    pub jitter_ms: u64,
    /// Probability in [0, 1] that a datagram is dropped
    pub loss: f64,
}

impl NetworkConditions {
    /// No delay, no loss
    pub fn perfect() -> Self {
        Self {
            latency_ms: 0,
            jitter_ms: 0,
            loss: 0.0,
        }
    }
}

impl Default for NetworkConditions {
    fn default() -> Self {
        Self::perfect()
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    deliver_at: Duration,
    /// Send order, breaks ties between equal delivery times
    order: u64,
    bytes: Vec<u8>,
}

/// A one-way lossy, reordering datagram link
#[derive(Debug, Clone)]
pub struct EmulatedLink {
    conditions: NetworkConditions,
    rng: SimRng,
    /// Link-local clock
    now: Duration,
    in_flight: Vec<InFlight>,
    sent: u64,
    dropped: u64,
    delivered: u64,
}

impl EmulatedLink {
    /// Create a link with the given conditions and RNG seed
    pub fn new(conditions: NetworkConditions, seed: u64) -> Self {
        Self {
            conditions,
            rng: SimRng::new(seed),
            now: Duration::ZERO,
            in_flight: Vec::new(),
            sent: 0,
            dropped: 0,
            delivered: 0,
        }
    }

    /// Hand a datagram to the link
    pub fn send(&mut self, bytes: Vec<u8>) {
        let order = self.sent;
        self.sent += 1;

        if self.rng.chance(self.conditions.loss) {
            self.dropped += 1;
            tracing::trace!(order, "Emulated link dropped datagram");
            return;
        }

        let delay = self.conditions.latency_ms + self.rng.up_to(self.conditions.jitter_ms);
        self.in_flight.push(InFlight {
            deliver_at: self.now + Duration::from_millis(delay),
            order,
            bytes,
        });
    }

    /// Advance the link clock and collect everything now due
    ///
    /// Datagrams come out in delivery-time order, which differs from send
    /// order whenever jitter exceeds the gap between sends.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<Vec<u8>> {
        self.now += elapsed;

        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .in_flight
            .drain(..)
            .partition(|packet| packet.deliver_at <= now);
        self.in_flight = pending;

        due.sort_by_key(|packet| (packet.deliver_at, packet.order));
        self.delivered += due.len() as u64;
        due.into_iter().map(|packet| packet.bytes).collect()
    }

    /// Active conditions
    pub fn conditions(&self) -> NetworkConditions {
        self.conditions
    }

    /// Replace the conditions for datagrams sent from now on
    pub fn set_conditions(&mut self, conditions: NetworkConditions) {
        self.conditions = conditions;
    }

    /// Datagrams still in transit
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Datagrams handed to the link
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Datagrams lost
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Datagrams delivered
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_link_delivers_immediately() {
        let mut link = EmulatedLink::new(NetworkConditions::perfect(), 1);
        link.send(vec![1]);
        link.send(vec![2]);

        assert_eq!(link.advance(Duration::ZERO), vec![vec![1], vec![2]]);
        assert_eq!(link.delivered(), 2);
        assert_eq!(link.in_flight(), 0);
    }

    #[test]
    fn test_latency_delays_delivery() {
        let conditions = NetworkConditions {
            latency_ms: 50,
            ..Default::default()
        };
        let mut link = EmulatedLink::new(conditions, 1);
        link.send(vec![7]);

        assert!(link.advance(Duration::from_millis(49)).is_empty());
        assert_eq!(link.advance(Duration::from_millis(1)), vec![vec![7]]);
    }

    #[test]
    fn test_total_loss() {
        let conditions = NetworkConditions {
            loss: 1.0,
            ..Default::default()
        };
        let mut link = EmulatedLink::new(conditions, 9);
        for i in 0..10 {
            link.send(vec![i]);
        }

        assert!(link.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(link.sent(), 10);
        assert_eq!(link.dropped(), 10);
    }

    #[test]
    fn test_partial_loss_is_reproducible() {
        let conditions = NetworkConditions {
            loss: 0.3,
            ..Default::default()
        };
        let run = |seed| {
            let mut link = EmulatedLink::new(conditions, seed);
            for i in 0..200u8 {
                link.send(vec![i]);
            }
            link.advance(Duration::ZERO)
        };

        let first = run(42);
        assert_eq!(first, run(42));
        assert!(first.len() > 100 && first.len() < 200);
    }

    #[test]
    fn test_jitter_reorders() {
        let conditions = NetworkConditions {
            latency_ms: 10,
            jitter_ms: 80,
            loss: 0.0,
        };
        let mut link = EmulatedLink::new(conditions, 7);
        let mut delivered = Vec::new();
        for i in 0..50u8 {
            link.send(vec![i]);
            delivered.extend(link.advance(Duration::from_millis(1)));
        }
        delivered.extend(link.advance(Duration::from_secs(1)));

        let delivered: Vec<u8> = delivered.into_iter().map(|bytes| bytes[0]).collect();
        assert_eq!(delivered.len(), 50);
        assert!(delivered.windows(2).any(|pair| pair[0] > pair[1]));
    }
}
