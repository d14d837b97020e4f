//! Wire-level message records exchanged between roles
//!
//! Both types are plain values. They are copied across the process
//! boundary and never shared.

use crate::{Error, Pose, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One sequence-numbered input sample sent from controller to authority
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Move {
    /// Sequence number, starting at 1 and never reused
    pub sequence: u32,
    /// Forward/backward axis in [-1, 1]
    pub forward_axis: f32,
    /// Strafe axis in [-1, 1]
    pub right_axis: f32,
    /// Turn input, scaled by the turn rate
    pub yaw_delta: f32,
    /// Look input, scaled by the turn rate
    pub pitch_delta: f32,
}

impl Move {
    /// Check the move is something an authority may simulate
    ///
    /// Axes must be finite and within [-1, 1], deltas must be finite and the
    /// sequence must be non-zero (0 is reserved for the no-op ack).
    pub fn validate(&self) -> Result<()> {
        if self.sequence == 0 {
            return Err(self.invalid("sequence 0 is reserved"));
        }
        for (name, axis) in [
            ("forward_axis", self.forward_axis),
            ("right_axis", self.right_axis),
        ] {
            if !axis.is_finite() || !(-1.0..=1.0).contains(&axis) {
                return Err(self.invalid(format!("{name} {axis} outside [-1, 1]")));
            }
        }
        for (name, delta) in [("yaw_delta", self.yaw_delta), ("pitch_delta", self.pitch_delta)] {
            if !delta.is_finite() {
                return Err(self.invalid(format!("{name} is not finite")));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::InvalidMove {
            sequence: self.sequence,
            reason: reason.into(),
        }
    }
}

/// The authority's periodic state broadcast for one entity
///
/// Produced exactly once per authority interval and sent to the owning
/// controller and to every observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    /// Sequence of the last move simulated this interval, 0 if none
    pub acked_sequence: u32,
    /// Authority interval counter, incremented once per broadcast
    pub server_tick: u64,
    /// Authoritative position
    pub position: Vec3,
    /// Authoritative yaw in degrees
    pub yaw: f32,
    /// Authoritative pitch in degrees
    pub pitch: f32,
}

impl Ack {
    /// Create an ack carrying the given pose
    pub fn new(acked_sequence: u32, server_tick: u64, pose: Pose) -> Self {
        Self {
            acked_sequence,
            server_tick,
            position: pose.position,
            yaw: pose.yaw,
            pitch: pose.pitch,
        }
    }

    /// True when no move was processed in the interval
    pub fn is_noop(&self) -> bool {
        self.acked_sequence == 0
    }

    /// The authoritative pose carried by this ack
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.yaw, self.pitch)
    }
}
