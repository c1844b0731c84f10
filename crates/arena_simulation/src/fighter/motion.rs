//! Horizontal-plane kinematics of a fighter.
//!
//! Angle convention: on the zx plane, x+ axis is 0°, z+ axis is 90°,
//! angles limited to (-180, 180].

use bevy::prelude::*;

/// Limit angle to (-180, 180]
pub fn limit_angle(angle: f32) -> f32 {
    let mut result = angle % 360.0;
    if result > 180.0 {
        result -= 360.0;
    } else if result <= -180.0 {
        result += 360.0;
    }
    result
}

/// Horizontal angle of a vector (y ignored).
pub fn horizontal_angle(vector: Vec3) -> f32 {
    limit_angle(vector.z.atan2(vector.x).to_degrees())
}

/// Unit forward vector for a heading.
pub fn heading_to_forward(heading: f32) -> Vec3 {
    let radians = heading.to_radians();
    Vec3::new(radians.cos(), 0.0, radians.sin())
}

/// Kinematic state owned by the fighter. Physics collaborators read the
/// position and drain `impulse`.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec3,
    /// Degrees, see module docs
    pub heading: f32,
    pub gravity: bool,
    /// Pending velocity change (knockback), drained by physics
    pub impulse: Vec3,
    /// Set by `run`, cleared at the end of every tick
    pub ran_this_tick: bool,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
            gravity: true,
            impulse: Vec3::ZERO,
            ran_this_tick: false,
        }
    }
}

impl Body {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            heading: limit_angle(heading),
            ..Default::default()
        }
    }

    pub fn forward(&self) -> Vec3 {
        heading_to_forward(self.heading)
    }

    pub fn take_impulse(&mut self) -> Vec3 {
        std::mem::replace(&mut self.impulse, Vec3::ZERO)
    }
}
