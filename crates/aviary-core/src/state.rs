//! Viewer state shared with hosts.
//!
//! These types avoid platform APIs. The native host uses [`Viewer`] as the
//! stand-in for a tracked head pose: it feeds the camera anchor each frame
//! and builds the render matrices from it.

use glam::{Mat4, Quat, Vec3};

use crate::scene::Transform;

/// First-person viewer: a position on the floor plane plus a yaw.
///
/// Yaw 0 looks down -Z, matching the AR convention where the scene origin
/// is where the session started and content sits in front of the user.
#[derive(Clone, Debug)]
pub struct Viewer {
    pub position: Vec3,
    pub yaw: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Viewer {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            fovy_radians: std::f32::consts::FRAC_PI_3,
            znear: 0.01,
            zfar: 50.0,
        }
    }
}

/// Per-frame movement intent, each axis in -1..=1.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewerInput {
    pub forward: f32,
    pub strafe: f32,
    pub turn: f32,
}

impl Viewer {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Pose for the camera-following anchor.
    pub fn pose(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation())
    }

    /// Advance by `dt_sec` given walking speed (m/s) and turn rate (rad/s).
    pub fn step(&mut self, input: ViewerInput, dt_sec: f32, speed: f32, turn_rate: f32) {
        self.yaw += input.turn.clamp(-1.0, 1.0) * turn_rate * dt_sec;
        let walk = self.forward() * input.forward.clamp(-1.0, 1.0)
            + self.right() * input.strafe.clamp(-1.0, 1.0);
        self.position += walk * speed * dt_sec;
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }
}
