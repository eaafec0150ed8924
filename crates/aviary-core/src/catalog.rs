use glam::{Quat, Vec3};

use crate::constants::{LABEL_ADVANCE_RATIO, LABEL_FONT_SIZE, LABEL_Y};

/// Static authoring data for one bird.
///
/// Fields:
/// - `label`: text shown under the bird
/// - `model`, `placard`, `clip`: asset file names
/// - `anchor_position`: position of the bird's anchor relative to the scene origin
/// - `model_offset`, `model_scale`, `model_yaw`: placement of the model inside its anchor
/// - `initial_gain_db`: gain applied when the clip starts, before the first frame update
/// - `attenuation_scale`: the `k` constant of the proximity falloff
/// - `color_rgb`: marker color used by hosts that draw birds as billboards
#[derive(Clone, Debug, PartialEq)]
pub struct BirdSpec {
    pub label: &'static str,
    pub model: &'static str,
    pub placard: &'static str,
    pub clip: &'static str,
    pub anchor_position: Vec3,
    pub model_offset: Vec3,
    pub model_scale: f32,
    pub model_yaw: f32,
    pub initial_gain_db: f32,
    pub attenuation_scale: f32,
    pub color_rgb: [f32; 3],
}

impl BirdSpec {
    pub fn model_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.model_yaw)
    }
}

/// The five birds of the default scene, left to right along z = -1.
pub fn default_birds() -> Vec<BirdSpec> {
    vec![
        BirdSpec {
            label: "Blue Jay",
            model: "blue_jay.glb",
            placard: "bluejay.png",
            clip: "blue_jay.mp3",
            anchor_position: Vec3::new(-1.0, 0.0, -1.0),
            model_offset: Vec3::ZERO,
            model_scale: 0.003,
            model_yaw: 0.0,
            initial_gain_db: -30.0,
            attenuation_scale: 80.0,
            color_rgb: [0.25, 0.45, 0.95],
        },
        BirdSpec {
            label: "Northern Cardinal",
            model: "cardinal.glb",
            placard: "cardinal.png",
            clip: "cardinal.mp3",
            anchor_position: Vec3::new(-0.5, 0.0, -1.0),
            model_offset: Vec3::new(0.0, 0.02, 0.0),
            model_scale: 0.0004,
            model_yaw: std::f32::consts::FRAC_PI_3,
            initial_gain_db: -25.0,
            attenuation_scale: 80.0,
            color_rgb: [0.9, 0.15, 0.15],
        },
        BirdSpec {
            label: "Hairy Woodpecker",
            model: "hairy_woodpecker.glb",
            placard: "hairy.png",
            clip: "hairy.mp3",
            anchor_position: Vec3::new(0.0, 0.0, -1.0),
            model_offset: Vec3::ZERO,
            model_scale: 0.001,
            model_yaw: 0.0,
            initial_gain_db: 0.0,
            attenuation_scale: 60.0,
            color_rgb: [0.85, 0.85, 0.85],
        },
        BirdSpec {
            label: "American Herring Gull",
            model: "herring_gull.glb",
            placard: "herring.png",
            clip: "herring_gull.mp3",
            anchor_position: Vec3::new(0.5, 0.0, -1.0),
            model_offset: Vec3::new(0.0, 0.1, 0.0),
            model_scale: 0.0008,
            model_yaw: 0.0,
            initial_gain_db: -15.0,
            attenuation_scale: 80.0,
            color_rgb: [0.7, 0.75, 0.8],
        },
        BirdSpec {
            label: "Red-Tailed Hawk",
            model: "red_tailed_hawk.glb",
            placard: "redtail.png",
            clip: "red_tail.mp3",
            anchor_position: Vec3::new(1.0, 0.0, -1.0),
            model_offset: Vec3::new(0.0, 0.1, -0.2),
            model_scale: 0.01,
            model_yaw: 0.0,
            initial_gain_db: -10.0,
            attenuation_scale: 20.0,
            color_rgb: [0.65, 0.35, 0.15],
        },
    ]
}

/// Approximate rendered width of a label line.
#[inline]
pub fn label_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * LABEL_ADVANCE_RATIO
}

/// Label position inside the bird anchor: horizontally centered, below the placard.
pub fn label_offset(text: &str) -> Vec3 {
    Vec3::new(-label_width(text, LABEL_FONT_SIZE) / 2.0, LABEL_Y, 0.0)
}
