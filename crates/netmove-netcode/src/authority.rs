//! Authority-side move aggregation
//!
//! The authority does not simulate moves as they arrive. It queues them and,
//! once per fixed interval, drains the queue in receipt order, folds every
//! move into the authoritative pose, and emits exactly one [`Ack`].
//!
//! A gap in the received sequence numbers is not detected or requested
//! again: whatever arrived is simulated and nothing is fabricated for moves
//! that were lost.

use crate::{MoveBuffer, NetConfig, Result};
use netmove_core::{apply, Ack, IntervalTimer, Move, MovementConfig, Pose, Tick};

/// Authoritative state of one entity
#[derive(Debug, Clone)]
pub struct Authority {
    /// Ground-truth pose
    pose: Pose,
    /// Moves received since the last interval
    queue: MoveBuffer,
    /// Drives [`update`](Self::update)
    timer: IntervalTimer,
    movement: MovementConfig,
    /// Intervals processed so far
    server_tick: Tick,
    processed_moves: u64,
    rejected_moves: u64,
}

impl Authority {
    /// Create an authority for an entity starting at `pose`
    pub fn new(pose: Pose, config: &NetConfig) -> Self {
        Self {
            pose,
            queue: MoveBuffer::with_capacity(config.max_pending_moves),
            timer: IntervalTimer::new(config.authority_interval()),
            movement: config.movement,
            server_tick: 0,
            processed_moves: 0,
            rejected_moves: 0,
        }
    }

    /// Queue a received move for the next interval
    ///
    /// Invalid moves and moves that overflow a bounded queue are dropped and
    /// reported as errors; they are never simulated.
    pub fn receive_move(&mut self, step: Move) -> Result<()> {
        let queued = step
            .validate()
            .map_err(crate::Error::from)
            .and_then(|()| self.queue.push(step));
        if let Err(err) = &queued {
            self.rejected_moves += 1;
            tracing::warn!(seq = step.sequence, error = %err, "Dropping move");
        }
        queued
    }

    /// Advance the interval timer; returns an ack on each boundary
    pub fn update(&mut self, elapsed: std::time::Duration) -> Option<Ack> {
        self.timer
            .advance(elapsed)
            .then(|| self.process_interval())
    }

    /// Simulate everything queued and produce this interval's ack
    ///
    /// With an empty queue the ack carries sequence 0 and the unchanged pose.
    ///
    /// The acked sequence is that of the last move drained, not the highest
    /// one. When a newer move overtakes an older one inside the same
    /// interval, the ack pose already includes the newer move while its
    /// sequence only covers the older one. The controller then replays the
    /// newer move a second time, and stays off by that move until an ack
    /// for a later sequence arrives. Empty-interval acks do not repair it.
    pub fn process_interval(&mut self) -> Ack {
        self.server_tick += 1;

        let mut last_sequence = 0;
        let mut drained = 0u64;
        for step in self.queue.drain() {
            self.pose = apply(self.pose, &step, &self.movement);
            last_sequence = step.sequence;
            drained += 1;
        }
        self.processed_moves += drained;

        if drained > 0 {
            tracing::debug!(
                server_tick = self.server_tick,
                moves = drained,
                acked_seq = last_sequence,
                "Processed authority interval"
            );
        }

        Ack::new(last_sequence, self.server_tick, self.pose)
    }

    /// Authoritative pose
    pub fn current_pose(&self) -> Pose {
        self.pose
    }

    /// Intervals processed so far
    pub fn server_tick(&self) -> Tick {
        self.server_tick
    }

    /// Moves waiting for the next interval
    pub fn queued_moves(&self) -> usize {
        self.queue.len()
    }

    /// Moves simulated so far
    pub fn processed_moves(&self) -> u64 {
        self.processed_moves
    }

    /// Moves dropped by validation or a full queue
    pub fn rejected_moves(&self) -> u64 {
        self.rejected_moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netmove_core::Vec3;
    use std::time::Duration;

    fn make_move(sequence: u32, forward_axis: f32) -> Move {
        Move {
            sequence,
            forward_axis,
            right_axis: 0.0,
            yaw_delta: 0.0,
            pitch_delta: 0.0,
        }
    }

    fn authority() -> Authority {
        Authority::new(Pose::default(), &NetConfig::default())
    }

    #[test]
    fn test_empty_interval_is_noop_ack() {
        let mut authority = authority();
        let ack = authority.process_interval();

        assert!(ack.is_noop());
        assert_eq!(ack.server_tick, 1);
        assert_eq!(ack.pose(), Pose::default());
    }

    #[test]
    fn test_interval_acks_last_move() {
        let mut authority = authority();
        authority.receive_move(make_move(1, 1.0)).unwrap();
        authority.receive_move(make_move(2, 1.0)).unwrap();

        let ack = authority.process_interval();
        assert_eq!(ack.acked_sequence, 2);
        assert_eq!(ack.position, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(authority.queued_moves(), 0);
        assert_eq!(authority.processed_moves(), 2);

        // Nothing new: next ack is a no-op at the same pose
        let ack = authority.process_interval();
        assert!(ack.is_noop());
        assert_eq!(ack.position, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_lost_move_not_fabricated() {
        let mut authority = authority();
        // Move 1 was lost in transit
        authority.receive_move(make_move(2, 1.0)).unwrap();

        let ack = authority.process_interval();
        assert_eq!(ack.acked_sequence, 2);
        assert_eq!(ack.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_receipt_order_not_sequence_order() {
        let mut authority = authority();
        authority.receive_move(make_move(3, 1.0)).unwrap();
        authority.receive_move(make_move(2, -0.5)).unwrap();

        let ack = authority.process_interval();
        assert_eq!(ack.acked_sequence, 2);
        assert_eq!(ack.position, Vec3::new(0.0, 0.0, 2.5));
    }

    #[test]
    fn test_overtaken_move_replays_until_next_real_ack() {
        use crate::LocalController;
        use netmove_core::AxisInput;

        let config = NetConfig::default();
        let mut authority = Authority::new(Pose::default(), &config);
        let mut controller = LocalController::new(Pose::default(), &config);
        let sent: Vec<Move> = (0..3)
            .map(|_| controller.predict(AxisInput::forward(1.0)).unwrap())
            .collect();
        assert_eq!(controller.current_pose().position, Vec3::new(0.0, 0.0, 15.0));

        authority.receive_move(sent[0]).unwrap();
        controller.on_ack(&authority.process_interval());
        assert_eq!(controller.current_pose().position, Vec3::new(0.0, 0.0, 15.0));

        // Move 3 overtakes move 2 on the wire
        authority.receive_move(sent[2]).unwrap();
        authority.receive_move(sent[1]).unwrap();
        let ack = authority.process_interval();
        assert_eq!(ack.acked_sequence, 2);
        assert_eq!(ack.position, Vec3::new(0.0, 0.0, 15.0));

        // Move 3 is still pending and replays on top of a pose that has it
        controller.on_ack(&ack);
        assert_eq!(controller.pending_moves().len(), 1);
        assert_eq!(controller.current_pose().position, Vec3::new(0.0, 0.0, 20.0));

        for _ in 0..3 {
            controller.on_ack(&authority.process_interval());
        }
        assert_eq!(controller.current_pose().position, Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(authority.current_pose().position, Vec3::new(0.0, 0.0, 15.0));

        // The next real move's ack covers move 3 and the two agree again
        authority
            .receive_move(controller.predict(AxisInput::forward(1.0)).unwrap())
            .unwrap();
        controller.on_ack(&authority.process_interval());
        assert!(controller.pending_moves().is_empty());
        assert_eq!(controller.current_pose(), authority.current_pose());
    }

    #[test]
    fn test_update_fires_on_interval() {
        let mut authority = authority();
        authority.receive_move(make_move(1, 1.0)).unwrap();

        assert!(authority.update(Duration::from_millis(60)).is_none());
        assert_eq!(authority.queued_moves(), 1);

        let ack = authority.update(Duration::from_millis(60)).unwrap();
        assert_eq!(ack.acked_sequence, 1);
        assert_eq!(ack.server_tick, 1);
    }

    #[test]
    fn test_invalid_move_rejected() {
        let mut authority = authority();
        assert!(authority.receive_move(make_move(1, 3.0)).is_err());
        assert!(authority.receive_move(make_move(0, 1.0)).is_err());
        assert_eq!(authority.rejected_moves(), 2);
        assert_eq!(authority.queued_moves(), 0);
    }

    #[test]
    fn test_bounded_queue_drops_overflow() {
        let config = NetConfig {
            max_pending_moves: Some(2),
            ..Default::default()
        };
        let mut authority = Authority::new(Pose::default(), &config);
        authority.receive_move(make_move(1, 1.0)).unwrap();
        authority.receive_move(make_move(2, 1.0)).unwrap();
        assert!(matches!(
            authority.receive_move(make_move(3, 1.0)),
            Err(crate::Error::MoveBufferFull(2))
        ));

        let ack = authority.process_interval();
        assert_eq!(ack.acked_sequence, 2);
    }
}
