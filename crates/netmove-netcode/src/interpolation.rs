//! Snapshot interpolation for remotely controlled entities
//!
//! Observers only ever see the authority's periodic acks, roughly ten per
//! second. Rendering those directly would stair-step, so the observer runs
//! one interval behind and blends between consecutive samples instead.

use crate::NetConfig;
use netmove_core::{Ack, Pose, Tick};
use std::collections::VecDeque;
use std::time::Duration;

/// FIFO of authoritative samples blended over a fixed interval
///
/// Blending starts once two samples have been buffered. The displayed pose
/// lies between the oldest retained sample and the next one, parameterized
/// by `progress / interval`. It never extrapolates: with no newer sample it
/// holds at the newest one.
#[derive(Debug, Clone)]
pub struct InterpolationBuffer {
    /// Retained samples (oldest first)
    samples: VecDeque<Pose>,
    /// Time taken to blend from one sample to the next
    interval: Duration,
    /// Time spent blending toward `samples[1]`, within `[0, interval]`
    progress: Duration,
    /// Beyond this many samples the oldest are skipped
    max_samples: usize,
    /// Set once two samples have been buffered
    started: bool,
}

impl InterpolationBuffer {
    /// Create a buffer blending over `interval`
    pub fn new(interval: Duration, max_samples: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            interval,
            progress: Duration::ZERO,
            max_samples: max_samples.max(2),
            started: false,
        }
    }

    /// Append a sample
    ///
    /// If the buffer overflows, the oldest samples are dropped and the blend
    /// restarts from the new oldest pair.
    pub fn push(&mut self, sample: Pose) {
        self.samples.push_back(sample);
        if self.samples.len() > self.max_samples {
            while self.samples.len() > self.max_samples {
                self.samples.pop_front();
            }
            self.progress = Duration::ZERO;
        }
        if self.samples.len() >= 2 {
            self.started = true;
        }
    }

    /// Advance the blend by `elapsed`
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.started {
            return;
        }
        self.progress += elapsed;
        while self.progress > self.interval && self.samples.len() > 2 {
            self.samples.pop_front();
            self.progress -= self.interval;
            tracing::trace!(remaining = self.samples.len(), "Advanced interpolation pair");
        }
        // Starved: hold at the newest sample until another arrives
        if self.progress > self.interval {
            self.progress = self.interval;
        }
    }

    /// Pose to display, `None` before the first sample
    pub fn current(&self) -> Option<Pose> {
        match (self.samples.front(), self.samples.get(1)) {
            (Some(from), Some(to)) => Some(from.lerp(to, self.alpha())),
            (Some(only), None) => Some(*only),
            _ => None,
        }
    }

    /// Blend factor between the current pair, in [0, 1]
    pub fn alpha(&self) -> f32 {
        if self.interval.is_zero() {
            return 1.0;
        }
        (self.progress.as_secs_f32() / self.interval.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// True once two samples have been buffered
    pub fn is_interpolating(&self) -> bool {
        self.started
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when no sample has been retained
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// An observer's view of an entity controlled elsewhere
///
/// Feeds acks into an [`InterpolationBuffer`]. Acks are ordered by their
/// `server_tick`; one that is not newer than the last accepted is dropped
/// so reordering never walks the entity backwards.
#[derive(Debug, Clone)]
pub struct RemoteObserver {
    buffer: InterpolationBuffer,
    /// Pose shown before any ack arrives
    initial: Pose,
    last_server_tick: Option<Tick>,
}

impl RemoteObserver {
    /// Create an observer showing `initial` until the first ack arrives
    pub fn new(initial: Pose, config: &NetConfig) -> Self {
        Self {
            buffer: InterpolationBuffer::new(
                config.interpolation_interval(),
                config.max_interpolation_samples,
            ),
            initial,
            last_server_tick: None,
        }
    }

    /// Buffer the pose carried by an ack; returns false if it was stale
    pub fn on_ack(&mut self, ack: &Ack) -> bool {
        if self
            .last_server_tick
            .is_some_and(|last| ack.server_tick <= last)
        {
            tracing::debug!(
                server_tick = ack.server_tick,
                last_server_tick = ?self.last_server_tick,
                "Ignoring stale snapshot"
            );
            return false;
        }
        self.last_server_tick = Some(ack.server_tick);
        self.buffer.push(ack.pose());
        true
    }

    /// Advance the blend by one observer tick
    pub fn update(&mut self, elapsed: Duration) {
        self.buffer.advance(elapsed);
    }

    /// Smoothed pose to display
    pub fn current_pose(&self) -> Pose {
        self.buffer.current().unwrap_or(self.initial)
    }

    /// True once two samples have been buffered
    pub fn is_interpolating(&self) -> bool {
        self.buffer.is_interpolating()
    }

    /// Underlying sample buffer
    pub fn buffer(&self) -> &InterpolationBuffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmove_core::Vec3;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn at_x(x: f32) -> Pose {
        Pose::at(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_huge_sample_bound_is_only_a_limit() {
        let mut buffer = InterpolationBuffer::new(Duration::from_millis(100), usize::MAX);
        buffer.push(Pose::default());
        buffer.push(Pose::at(Vec3::X));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_needs_two_samples() {
        let mut buffer = InterpolationBuffer::new(INTERVAL, 8);
        assert!(buffer.current().is_none());

        buffer.push(at_x(0.0));
        assert!(!buffer.is_interpolating());
        buffer.advance(Duration::from_millis(50));
        assert_eq!(buffer.current(), Some(at_x(0.0)));

        buffer.push(at_x(10.0));
        assert!(buffer.is_interpolating());
        assert_eq!(buffer.current(), Some(at_x(0.0)));
    }

    #[test]
    fn test_blends_linearly() {
        let mut buffer = InterpolationBuffer::new(INTERVAL, 8);
        buffer.push(at_x(0.0));
        buffer.push(at_x(10.0));

        buffer.advance(Duration::from_millis(25));
        let pose = buffer.current().unwrap();
        assert!((pose.position.x - 2.5).abs() < 1e-4);

        buffer.advance(Duration::from_millis(25));
        let pose = buffer.current().unwrap();
        assert!((pose.position.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_advances_to_next_pair() {
        let mut buffer = InterpolationBuffer::new(INTERVAL, 8);
        buffer.push(at_x(0.0));
        buffer.push(at_x(10.0));
        buffer.push(at_x(20.0));

        buffer.advance(Duration::from_millis(150));
        assert_eq!(buffer.len(), 2);
        let pose = buffer.current().unwrap();
        assert!((pose.position.x - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_starvation_holds_newest() {
        let mut buffer = InterpolationBuffer::new(INTERVAL, 8);
        buffer.push(at_x(0.0));
        buffer.push(at_x(10.0));

        for _ in 0..20 {
            buffer.advance(Duration::from_millis(16));
        }
        assert_eq!(buffer.current(), Some(at_x(10.0)));

        // A fresh sample resumes motion from where it was held
        buffer.push(at_x(20.0));
        buffer.advance(Duration::from_millis(50));
        let pose = buffer.current().unwrap();
        assert!(pose.position.x > 10.0 && pose.position.x < 20.0);
    }

    #[test]
    fn test_never_overshoots() {
        let mut buffer = InterpolationBuffer::new(INTERVAL, 8);
        let samples = [0.0, 4.0, -3.0, 12.0, 12.5, 7.0];
        buffer.push(at_x(samples[0]));
        buffer.push(at_x(samples[1]));

        let mut next = 2;
        for frame in 0..120 {
            if frame % 6 == 0 && next < samples.len() {
                buffer.push(at_x(samples[next]));
                next += 1;
            }
            buffer.advance(Duration::from_millis(17));

            let x = buffer.current().unwrap().position.x;
            let a = buffer.samples[0].position.x;
            let b = buffer.samples[1].position.x;
            assert!(x >= a.min(b) - 1e-4 && x <= a.max(b) + 1e-4);
        }
        assert_eq!(buffer.current(), Some(at_x(7.0)));
    }

    #[test]
    fn test_overflow_skips_ahead() {
        let mut buffer = InterpolationBuffer::new(INTERVAL, 3);
        for x in 0..5 {
            buffer.push(at_x(x as f32));
        }
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.current(), Some(at_x(2.0)));
    }

    #[test]
    fn test_observer_drops_stale_snapshots() {
        let mut observer = RemoteObserver::new(Pose::default(), &NetConfig::default());
        assert_eq!(observer.current_pose(), Pose::default());

        assert!(observer.on_ack(&Ack::new(0, 1, at_x(1.0))));
        assert!(observer.on_ack(&Ack::new(4, 3, at_x(3.0))));
        assert!(!observer.on_ack(&Ack::new(2, 2, at_x(2.0))));
        assert!(!observer.on_ack(&Ack::new(4, 3, at_x(3.0))));

        assert_eq!(observer.buffer().len(), 2);
        assert!(observer.is_interpolating());
    }

    #[test]
    fn test_observer_smooths_stream() {
        let mut observer = RemoteObserver::new(Pose::default(), &NetConfig::default());
        for tick in 1..=3u64 {
            observer.on_ack(&Ack::new(0, tick, at_x(tick as f32 * 10.0)));
        }

        observer.update(Duration::from_millis(50));
        let x = observer.current_pose().position.x;
        assert!((x - 15.0).abs() < 1e-4);
    }
}
