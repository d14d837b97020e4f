//! Client-side prediction for the locally controlled entity
//!
//! Input is applied to the local pose the moment it is captured, and the
//! move is queued until the authority acknowledges it. See
//! [`Reconciler`](crate::Reconciler) for what happens when an ack arrives.

use crate::{MoveBuffer, NetConfig, ReconcileOutcome, Reconciler};
use netmove_core::{
    apply, Ack, AxisInput, InputAccumulator, Move, MoveSequencer, MovementConfig, Pose,
};
use serde::{Deserialize, Serialize};

/// Diagnostic counters for a controller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NetStats {
    /// Moves handed to the transport
    pub sent_moves: u64,
    /// Moves removed from the pending buffer by acks
    pub acked_moves: u64,
    /// Moves still waiting for an ack
    pub pending_moves: usize,
    /// Highest ack sequence applied
    pub last_acked_sequence: u32,
    /// Acks that reset the pose
    pub corrections: u64,
    /// Distance moved by the most recent correction
    pub last_correction_distance: f32,
}

/// The locally controlled side of an entity
///
/// Each tick, at most one move leaves the controller. Input events recorded
/// during the tick coalesce into that move, and a tick with no input sends
/// nothing.
///
/// # Example
///
/// ```
/// use netmove_core::{Ack, AxisInput, Pose, Vec3};
/// use netmove_netcode::{LocalController, NetConfig};
///
/// let mut controller = LocalController::new(Pose::default(), &NetConfig::default());
/// let sent = controller.predict(AxisInput::forward(1.0)).unwrap();
/// assert_eq!(controller.current_pose().position, Vec3::new(0.0, 0.0, 5.0));
///
/// // The authority agrees
/// controller.on_ack(&Ack::new(sent.sequence, 1, Pose::at(Vec3::new(0.0, 0.0, 5.0))));
/// assert_eq!(controller.current_pose().position, Vec3::new(0.0, 0.0, 5.0));
/// assert_eq!(controller.acked_move_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct LocalController {
    /// Predicted pose
    pose: Pose,
    /// Sequence numbers for outgoing moves
    sequencer: MoveSequencer,
    /// Input recorded since the last tick
    input: InputAccumulator,
    /// Moves sent but not yet acknowledged
    pending: MoveBuffer,
    /// Correction logic
    reconciler: Reconciler,
    movement: MovementConfig,
    sent_moves: u64,
}

impl LocalController {
    /// Create a controller starting at `pose`
    pub fn new(pose: Pose, config: &NetConfig) -> Self {
        Self {
            pose,
            sequencer: MoveSequencer::new(),
            input: InputAccumulator::new(),
            pending: MoveBuffer::new(),
            reconciler: Reconciler::new(config.orientation_policy)
                .with_snap_warn_distance(config.snap_warn_distance),
            movement: config.movement,
            sent_moves: 0,
        }
    }

    /// Input accumulator for event-style input between ticks
    pub fn input_mut(&mut self) -> &mut InputAccumulator {
        &mut self.input
    }

    /// Close the current tick
    ///
    /// If any input was recorded this tick, builds one move from it,
    /// predicts it locally, queues it as pending, and returns it for the
    /// caller to transmit. The move is not retried if the send is lost.
    pub fn tick(&mut self) -> Option<Move> {
        let input = self.input.take()?;
        let step = self.sequencer.capture_move(input);

        self.pose = apply(self.pose, &step, &self.movement);
        if let Err(err) = self.pending.push(step) {
            // Unbounded buffer; unreachable unless the constructor changes
            tracing::warn!(seq = step.sequence, error = %err, "Pending buffer refused move");
            debug_assert!(false, "controller pending buffer refused a move");
        }
        self.sent_moves += 1;

        tracing::trace!(
            seq = step.sequence,
            pending = self.pending.len(),
            "Predicted and dispatched move"
        );
        Some(step)
    }

    /// Record a full input sample and close the tick
    pub fn predict(&mut self, input: AxisInput) -> Option<Move> {
        self.input.record(input);
        self.tick()
    }

    /// Reconcile against an ack from the authority
    pub fn on_ack(&mut self, ack: &Ack) -> ReconcileOutcome {
        self.reconciler
            .reconcile(&mut self.pose, &mut self.pending, ack, &self.movement)
    }

    /// Current predicted pose
    pub fn current_pose(&self) -> Pose {
        self.pose
    }

    /// Moves sent so far
    pub fn sent_move_count(&self) -> u64 {
        self.sent_moves
    }

    /// Moves acknowledged so far
    pub fn acked_move_count(&self) -> u64 {
        self.reconciler.acked_moves()
    }

    /// Moves awaiting acknowledgement
    pub fn pending_moves(&self) -> &MoveBuffer {
        &self.pending
    }

    /// Snapshot of the diagnostic counters
    pub fn stats(&self) -> NetStats {
        NetStats {
            sent_moves: self.sent_moves,
            acked_moves: self.reconciler.acked_moves(),
            pending_moves: self.pending.len(),
            last_acked_sequence: self.reconciler.last_acked_sequence(),
            corrections: self.reconciler.corrections(),
            last_correction_distance: self.reconciler.last_correction_distance(),
        }
    }
}
