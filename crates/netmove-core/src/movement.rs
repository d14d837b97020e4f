//! Deterministic movement step shared by controller and authority
//!
//! [`apply`] is the prediction engine. The controller runs it to predict,
//! the authority runs it to simulate, and reconciliation runs it to replay.
//! All three must agree bit-for-bit, so the step reads nothing but its
//! arguments.

use crate::{Error, Move, Pose, Result};
use serde::{Deserialize, Serialize};

/// Tunables for the movement step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Distance covered per unit of axis input
    pub movement_speed: f32,
    /// Degrees turned per unit of yaw/pitch delta
    pub turn_rate: f32,
    /// Pitch is clamped to `[-max_pitch, max_pitch]` degrees
    pub max_pitch: f32,
}

impl MovementConfig {
    /// Check that every field is usable
    pub fn validate(&self) -> Result<()> {
        if !self.movement_speed.is_finite() || self.movement_speed < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "movement_speed must be finite and non-negative, got {}",
                self.movement_speed
            )));
        }
        if !self.turn_rate.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "turn_rate must be finite, got {}",
                self.turn_rate
            )));
        }
        if !(0.0..=90.0).contains(&self.max_pitch) {
            return Err(Error::InvalidConfig(format!(
                "max_pitch must be within [0, 90], got {}",
                self.max_pitch
            )));
        }
        Ok(())
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            movement_speed: 5.0,
            turn_rate: 1.0,
            max_pitch: 89.0,
        }
    }
}

/// Apply one move to a pose
///
/// Rotation comes first, then translation along the post-rotation
/// forward/right axes: the input axes of a move are relative to the heading
/// it produces.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use netmove_core::{apply, Move, MovementConfig, Pose};
///
/// let step = Move { sequence: 1, forward_axis: 1.0, right_axis: 0.0, yaw_delta: 0.0, pitch_delta: 0.0 };
/// let pose = apply(Pose::default(), &step, &MovementConfig::default());
/// assert_eq!(pose.position, Vec3::new(0.0, 0.0, 5.0));
/// ```
pub fn apply(pose: Pose, step: &Move, config: &MovementConfig) -> Pose {
    let yaw = (pose.yaw + step.yaw_delta * config.turn_rate).rem_euclid(360.0);
    let pitch = (pose.pitch + step.pitch_delta * config.turn_rate)
        .clamp(-config.max_pitch, config.max_pitch);

    let rotated = Pose {
        position: pose.position,
        yaw,
        pitch,
    };

    let displacement = rotated.forward() * (config.movement_speed * step.forward_axis)
        + rotated.right() * (config.movement_speed * step.right_axis);

    Pose {
        position: rotated.position + displacement,
        ..rotated
    }
}

/// Apply a run of moves in order, each composing on the previous result
pub fn apply_all<'a>(
    pose: Pose,
    moves: impl IntoIterator<Item = &'a Move>,
    config: &MovementConfig,
) -> Pose {
    moves
        .into_iter()
        .fold(pose, |pose, step| apply(pose, step, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn make_move(sequence: u32, forward_axis: f32, right_axis: f32, yaw_delta: f32) -> Move {
        Move {
            sequence,
            forward_axis,
            right_axis,
            yaw_delta,
            pitch_delta: 0.0,
        }
    }

    #[test]
    fn test_forward_step() {
        let config = MovementConfig::default();
        let pose = apply(Pose::default(), &make_move(1, 1.0, 0.0, 0.0), &config);
        assert_eq!(pose.position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(pose.yaw, 0.0);
    }

    #[test]
    fn test_rotation_before_translation() {
        let config = MovementConfig {
            turn_rate: 90.0,
            ..Default::default()
        };
        // A full yaw delta turns a quarter, so forward now points along +X
        let pose = apply(Pose::default(), &make_move(1, 1.0, 0.0, 1.0), &config);
        assert!(pose.position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
        assert_eq!(pose.yaw, 90.0);
    }

    #[test]
    fn test_strafe_right() {
        let config = MovementConfig::default();
        let pose = apply(Pose::default(), &make_move(1, 0.0, -1.0, 0.0), &config);
        assert_eq!(pose.position, Vec3::new(-5.0, 0.0, 0.0));
    }

    #[test]
    fn test_pitch_clamped() {
        let config = MovementConfig {
            turn_rate: 50.0,
            ..Default::default()
        };
        let mut step = make_move(1, 0.0, 0.0, 0.0);
        step.pitch_delta = 3.0;
        let pose = apply(Pose::default(), &step, &config);
        assert_eq!(pose.pitch, 89.0);
    }

    #[test]
    fn test_deterministic() {
        let config = MovementConfig::default();
        let start = Pose::new(Vec3::new(1.25, 0.0, -3.5), 33.0, 4.0);
        let a = make_move(1, 0.7, -0.3, 2.5);
        let b = make_move(2, -0.2, 0.9, -7.0);

        let first = apply(apply(start, &a, &config), &b, &config);
        let second = apply(apply(start, &a, &config), &b, &config);
        assert_eq!(first, second);
        assert_eq!(first, apply_all(start, [&a, &b], &config));
    }

    #[test]
    fn test_order_matters() {
        let config = MovementConfig {
            turn_rate: 90.0,
            ..Default::default()
        };
        let turn = make_move(1, 0.0, 0.0, 1.0);
        let walk = make_move(2, 1.0, 0.0, 0.0);

        let turn_then_walk = apply_all(Pose::default(), [&turn, &walk], &config);
        let walk_then_turn = apply_all(Pose::default(), [&walk, &turn], &config);
        assert_ne!(turn_then_walk.position, walk_then_turn.position);
    }

    #[test]
    fn test_validate_config() {
        assert!(MovementConfig::default().validate().is_ok());
        let bad = MovementConfig {
            movement_speed: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = MovementConfig {
            max_pitch: 120.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_from_ron() {
        let config: MovementConfig = ron::from_str("(movement_speed: 2.5)").unwrap();
        assert_eq!(config.movement_speed, 2.5);
        assert_eq!(config.turn_rate, 1.0);
    }
}
