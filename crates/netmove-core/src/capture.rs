//! Move capture: sequence assignment and per-tick input coalescing
//!
//! Input events arrive at whatever rate the input layer produces them. A
//! controller sends at most one move per tick, so events inside a tick are
//! folded into one [`AxisInput`] (last writer wins per axis) before the
//! [`MoveSequencer`] stamps it with a sequence number.

use crate::Move;
use serde::{Deserialize, Serialize};

/// One tick's worth of sampled input
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisInput {
    pub forward_axis: f32,
    pub right_axis: f32,
    pub yaw_delta: f32,
    pub pitch_delta: f32,
}

impl AxisInput {
    /// Create an input sample
    pub fn new(forward_axis: f32, right_axis: f32, yaw_delta: f32, pitch_delta: f32) -> Self {
        Self {
            forward_axis,
            right_axis,
            yaw_delta,
            pitch_delta,
        }
    }

    /// Pure forward/backward input
    pub fn forward(axis: f32) -> Self {
        Self {
            forward_axis: axis,
            ..Default::default()
        }
    }

    /// True when no axis carries input
    pub fn is_idle(&self) -> bool {
        self.forward_axis == 0.0
            && self.right_axis == 0.0
            && self.yaw_delta == 0.0
            && self.pitch_delta == 0.0
    }
}

/// Folds input events inside one tick into a single [`AxisInput`]
#[derive(Debug, Clone, Default)]
pub struct InputAccumulator {
    pending: AxisInput,
    touched: bool,
}

impl InputAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_forward(&mut self, axis: f32) {
        self.pending.forward_axis = axis;
        self.touched = true;
    }

    pub fn set_right(&mut self, axis: f32) {
        self.pending.right_axis = axis;
        self.touched = true;
    }

    pub fn set_yaw(&mut self, delta: f32) {
        self.pending.yaw_delta = delta;
        self.touched = true;
    }

    pub fn set_pitch(&mut self, delta: f32) {
        self.pending.pitch_delta = delta;
        self.touched = true;
    }

    /// Overwrite every axis with a full sample
    pub fn record(&mut self, input: AxisInput) {
        self.pending = input;
        self.touched = true;
    }

    /// Take the coalesced input and reset for the next tick
    ///
    /// Returns `None` if nothing was recorded or every recorded axis is zero.
    pub fn take(&mut self) -> Option<AxisInput> {
        let input = std::mem::take(&mut self.pending);
        let touched = std::mem::replace(&mut self.touched, false);
        (touched && !input.is_idle()).then_some(input)
    }
}

/// Per-entity sequence counter
///
/// Sequence numbers start at 1 and advance by one for every captured move,
/// whether or not that move ever reaches the authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveSequencer {
    next: u32,
}

impl MoveSequencer {
    /// Create a sequencer whose first move is sequence 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Stamp an input sample with the next sequence number
    pub fn capture_move(&mut self, input: AxisInput) -> Move {
        let sequence = self.next;
        // Skip 0 on wrap; it is the no-op ack marker
        self.next = self.next.checked_add(1).unwrap_or(1);
        Move {
            sequence,
            forward_axis: input.forward_axis,
            right_axis: input.right_axis,
            yaw_delta: input.yaw_delta,
            pitch_delta: input.pitch_delta,
        }
    }

    /// The sequence the next captured move will carry
    pub fn peek_next(&self) -> u32 {
        self.next
    }

    /// Number of moves captured so far
    pub fn captured(&self) -> u32 {
        self.next - 1
    }
}

impl Default for MoveSequencer {
    fn default() -> Self {
        Self::new()
    }
}
