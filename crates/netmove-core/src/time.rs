//! Fixed-interval timing for the authority cadence
//!
//! The authority ticks at a fixed wall-clock interval while the frames that
//! drive it arrive at a variable rate. [`IntervalTimer`] turns a stream of
//! elapsed durations into interval boundaries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A discrete interval counter
pub type Tick = u64;

/// Accumulates elapsed time and reports fixed-interval boundaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalTimer {
    /// Length of one interval
    interval: Duration,
    /// Time accumulated since the last boundary
    accumulated: Duration,
    /// Boundaries crossed so far
    tick: Tick,
}

impl IntervalTimer {
    /// Create a timer with the given interval
    ///
    /// A zero interval fires on every advance.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
            tick: 0,
        }
    }

    /// Create a timer from a millisecond interval
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Add elapsed time; returns true if an interval boundary was crossed
    ///
    /// At most one boundary is reported per call. Time beyond a single
    /// whole interval is discarded so a long stall produces one boundary
    /// rather than a burst.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.accumulated += elapsed;
        if self.accumulated < self.interval {
            return false;
        }
        self.accumulated -= self.interval;
        if self.accumulated >= self.interval {
            self.accumulated = Duration::ZERO;
        }
        self.tick += 1;
        true
    }

    /// Number of boundaries crossed
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Configured interval length
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated toward the next boundary
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::from_millis(100)
    }
}
