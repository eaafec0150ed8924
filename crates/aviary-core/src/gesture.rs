use glam::{Quat, Vec3};

use crate::constants::{MAX_GESTURE_SCALE, MIN_GESTURE_SCALE};
use crate::scene::Transform;

/// Direct manipulation applied to a bird's anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Move by a world offset; the vertical component is ignored.
    Translate(Vec3),
    /// Yaw about +Y, in radians.
    Rotate(f32),
    /// Multiply the current uniform scale.
    Scale(f32),
}

impl Gesture {
    pub fn apply(self, transform: &mut Transform) {
        match self {
            Gesture::Translate(delta) => {
                transform.translation += Vec3::new(delta.x, 0.0, delta.z);
            }
            Gesture::Rotate(angle) => {
                let yawed = Quat::from_rotation_y(angle) * transform.rotation;
                transform.rotation = yawed.normalize();
            }
            Gesture::Scale(factor) => {
                if !factor.is_finite() || factor <= 0.0 {
                    return;
                }
                let s = (transform.scale.x * factor).clamp(MIN_GESTURE_SCALE, MAX_GESTURE_SCALE);
                transform.scale = Vec3::splat(s);
            }
        }
    }
}
