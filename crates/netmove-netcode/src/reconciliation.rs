//! Server state reconciliation
//!
//! When an ack arrives the controller throws away the moves the authority
//! has already folded into its state, resets to the authoritative pose, and
//! replays whatever is still unacknowledged on top of it.

use crate::MoveBuffer;
use netmove_core::{apply, Ack, MovementConfig, Pose};
use serde::{Deserialize, Serialize};

/// What happens to the controller's look direction across a correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrientationPolicy {
    /// Take yaw and pitch from the ack, then let replay re-derive them
    #[default]
    Overwrite,
    /// Correct position only; keep the latest local yaw and pitch
    PreserveLocal,
}

/// Result of handling one ack
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReconcileOutcome {
    /// The ack carried sequence 0; nothing to reconcile
    NoOp,
    /// The ack is not newer than one already applied
    Stale {
        acked_sequence: u32,
        last_acked_sequence: u32,
    },
    /// The pose was reset and pending moves replayed
    Reconciled {
        /// Moves removed from the pending buffer
        discarded: usize,
        /// Moves replayed on top of the authoritative pose
        replayed: usize,
        /// Distance between the pose before and after the correction
        correction: f32,
    },
}

impl ReconcileOutcome {
    /// True if the pose was touched
    pub fn is_reconciled(&self) -> bool {
        matches!(self, ReconcileOutcome::Reconciled { .. })
    }
}

/// Applies authoritative corrections to a predicted pose
#[derive(Debug, Clone)]
pub struct Reconciler {
    policy: OrientationPolicy,
    /// Corrections above this distance are logged as warnings
    snap_warn_distance: f32,
    /// Highest ack sequence applied so far
    last_acked_sequence: u32,
    /// Moves acknowledged in total
    acked_moves: u64,
    /// Acks that reset the pose
    corrections: u64,
    last_correction_distance: f32,
}

impl Reconciler {
    /// Create a reconciler with the given orientation policy
    pub fn new(policy: OrientationPolicy) -> Self {
        Self {
            policy,
            snap_warn_distance: f32::INFINITY,
            last_acked_sequence: 0,
            acked_moves: 0,
            corrections: 0,
            last_correction_distance: 0.0,
        }
    }

    /// Warn when a correction moves the pose farther than `distance`
    pub fn with_snap_warn_distance(mut self, distance: f32) -> Self {
        self.snap_warn_distance = distance;
        self
    }

    /// Reconcile `pose` and `pending` against an ack
    ///
    /// 1. Sequence 0 and acks not newer than the last applied one are
    ///    ignored, leaving both pose and buffer untouched.
    /// 2. Moves up to the acked sequence leave the buffer.
    /// 3. The pose resets to the ack.
    /// 4. Remaining moves replay oldest to newest.
    ///
    /// With no new input between send and ack, the replayed pose equals the
    /// pose predicted before the ack arrived.
    pub fn reconcile(
        &mut self,
        pose: &mut Pose,
        pending: &mut MoveBuffer,
        ack: &Ack,
        movement: &MovementConfig,
    ) -> ReconcileOutcome {
        if ack.is_noop() {
            return ReconcileOutcome::NoOp;
        }
        if ack.acked_sequence <= self.last_acked_sequence {
            tracing::debug!(
                acked_seq = ack.acked_sequence,
                last_acked_seq = self.last_acked_sequence,
                "Ignoring stale ack"
            );
            return ReconcileOutcome::Stale {
                acked_sequence: ack.acked_sequence,
                last_acked_sequence: self.last_acked_sequence,
            };
        }
        self.last_acked_sequence = ack.acked_sequence;

        let discarded = pending.acknowledge(ack.acked_sequence);
        self.acked_moves += discarded as u64;

        let predicted = *pose;
        let mut corrected = ack.pose();
        for step in pending.iter() {
            corrected = apply(corrected, step, movement);
        }
        if self.policy == OrientationPolicy::PreserveLocal {
            corrected.yaw = predicted.yaw;
            corrected.pitch = predicted.pitch;
        }
        *pose = corrected;

        let correction = predicted.distance(&corrected);
        self.corrections += 1;
        self.last_correction_distance = correction;

        if correction > self.snap_warn_distance {
            tracing::warn!(
                acked_seq = ack.acked_sequence,
                correction,
                "Large correction from authority"
            );
        }
        tracing::debug!(
            acked_seq = ack.acked_sequence,
            discarded,
            replayed = pending.len(),
            correction,
            "Reconciled client prediction with authority"
        );

        ReconcileOutcome::Reconciled {
            discarded,
            replayed: pending.len(),
            correction,
        }
    }

    /// Highest ack sequence applied
    pub fn last_acked_sequence(&self) -> u32 {
        self.last_acked_sequence
    }

    /// Moves acknowledged in total
    pub fn acked_moves(&self) -> u64 {
        self.acked_moves
    }

    /// Acks that reset the pose
    pub fn corrections(&self) -> u64 {
        self.corrections
    }

    /// Distance moved by the most recent correction
    pub fn last_correction_distance(&self) -> f32 {
        self.last_correction_distance
    }

    /// The active orientation policy
    pub fn policy(&self) -> OrientationPolicy {
        self.policy
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(OrientationPolicy::default())
    }
}
