//! Rover pose as supplied by telemetry.

use serde::{Deserialize, Serialize};

/// Rover pose: world position plus attitude angles.
///
/// All angles are degrees in [0, 360) as reported by the simulator.
/// Position is in world units (one unit = `world_scale` rectified pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// X position in world units.
    pub x: f32,
    /// Y position in world units.
    pub y: f32,
    /// Heading angle in degrees, CCW positive.
    pub yaw: f32,
    /// Pitch angle in degrees.
    pub pitch: f32,
    /// Roll angle in degrees.
    pub roll: f32,
}

impl Pose {
    /// Create a new pose.
    #[inline]
    pub fn new(x: f32, y: f32, yaw: f32, pitch: f32, roll: f32) -> Self {
        Self {
            x,
            y,
            yaw,
            pitch,
            roll,
        }
    }

    /// Heading in radians.
    #[inline]
    pub fn yaw_rad(&self) -> f32 {
        self.yaw.to_radians()
    }

    /// True when roll and pitch are both within the given tolerances of
    /// level, accounting for the 0/360 wrap (e.g. 359.7° is 0.3° of roll).
    pub fn is_level(&self, roll_limit: f32, pitch_limit: f32) -> bool {
        near_level(self.roll, roll_limit) && near_level(self.pitch, pitch_limit)
    }
}

/// Angle within `limit` degrees of zero on the 0-360 circle.
#[inline]
fn near_level(angle: f32, limit: f32) -> bool {
    angle < limit || angle > 360.0 - limit
}
