//! Simulated pose of a movable entity
//!
//! Angles are in degrees. Yaw turns about the vertical (+Y) axis; at yaw 0
//! the entity faces +Z and its right hand points to +X. Pitch is the look
//! angle and does not tilt the movement plane.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Position and orientation of one entity
///
/// On a Local-Controller this is speculative, on the Authority it is ground
/// truth, and on a Remote-Observer it is a smoothed reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// World position
    pub position: Vec3,
    /// Heading in degrees
    pub yaw: f32,
    /// Look pitch in degrees
    pub pitch: f32,
}

impl Pose {
    /// Create a pose from its parts
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    /// Create a pose at a position with zero orientation
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Unit vector the entity walks along for a positive forward axis
    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(sin, 0.0, cos)
    }

    /// Unit vector the entity strafes along for a positive right axis
    pub fn right(&self) -> Vec3 {
        let (sin, cos) = self.yaw.to_radians().sin_cos();
        Vec3::new(cos, 0.0, -sin)
    }

    /// Euclidean distance between two positions
    pub fn distance(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }

    /// Blend toward `target` by `t` in [0, 1]
    ///
    /// Position blends linearly; yaw and pitch take the shortest arc. The
    /// endpoints are returned exactly, so `t >= 1.0` yields `target`
    /// bit-for-bit.
    pub fn lerp(&self, target: &Pose, t: f32) -> Pose {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return *target;
        }
        Pose {
            position: self.position.lerp(target.position, t),
            yaw: lerp_angle(self.yaw, target.yaw, t),
            pitch: lerp_angle(self.pitch, target.pitch, t),
        }
    }
}

/// Shortest-arc interpolation between two angles in degrees
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = (to - from + 180.0).rem_euclid(360.0) - 180.0;
    from + delta * t
}
