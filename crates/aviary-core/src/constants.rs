use glam::Vec3;

// Shared scene tuning constants used by the core and the native host.

// Placard (photo card under each bird)
pub const PLACARD_WIDTH: f32 = 0.2;
pub const PLACARD_DEPTH: f32 = 0.1;
pub const PLACARD_PITCH: f32 = std::f32::consts::FRAC_PI_2; // stand the plane up, facing the viewer
pub const PLACARD_OFFSET: [f32; 3] = [0.0, -0.06, 0.02];

// Text label
pub const LABEL_FONT_SIZE: f32 = 0.03;
pub const LABEL_Y: f32 = -0.15;
pub const LABEL_ADVANCE_RATIO: f32 = 0.55; // average glyph advance relative to font size

// Gestures
pub const MIN_GESTURE_SCALE: f32 = 0.25;
pub const MAX_GESTURE_SCALE: f32 = 4.0;

// Interaction
pub const PICK_SPHERE_RADIUS: f32 = 0.08; // ray-sphere radius for picking a bird

#[inline]
pub fn placard_offset_vec3() -> Vec3 {
    Vec3::new(PLACARD_OFFSET[0], PLACARD_OFFSET[1], PLACARD_OFFSET[2])
}
