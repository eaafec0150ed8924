use glam::Vec3;

/// Planar "ray" magnitude: the product of the two horizontal offset
/// components, scaled by the object's attenuation constant.
///
/// This is not a distance. A viewer on either horizontal axis of the object
/// (pure lateral or pure depth offset) yields zero regardless of range.
#[inline]
pub fn ray_magnitude(delta: Vec3, scale: f32) -> f32 {
    (delta.x * delta.z).abs() * scale
}

/// Gain in decibels for a viewer at `delta` in the object's local frame.
/// 0 dB is unity, more negative is quieter. Unclamped.
#[inline]
pub fn proximity_gain_db(delta: Vec3, scale: f32) -> f32 {
    0.0 - ray_magnitude(delta, scale)
}

/// Left/right placement of a source at `offset` in the listener's frame
/// (-Z forward, +X right). -1 is hard left, 1 is hard right, 0 is centered.
/// Height is ignored, and a source at the listener's position is centered.
#[inline]
pub fn stereo_pan(offset: Vec3) -> f32 {
    let planar = offset.x.hypot(offset.z);
    if planar <= f32::EPSILON {
        return 0.0;
    }
    (offset.x / planar).clamp(-1.0, 1.0)
}

/// Convert a decibel gain to a linear amplitude factor.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Inclusive decibel bounds a host audio engine can accept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainRange {
    pub min_db: f32,
    pub max_db: f32,
}

impl GainRange {
    pub const fn new(min_db: f32, max_db: f32) -> Self {
        Self { min_db, max_db }
    }

    #[inline]
    pub fn clamp(&self, db: f32) -> f32 {
        db.clamp(self.min_db, self.max_db)
    }
}
