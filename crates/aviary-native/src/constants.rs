// Host-side tuning constants for the desktop stand-in of the AR view.

// Viewer motion
pub const WALK_SPEED: f32 = 1.2; // meters per second
pub const TURN_RATE: f32 = 1.5; // radians per second

// Gestures
pub const ROTATE_STEP: f32 = 0.15; // radians per Q/E press
pub const SCROLL_SCALE_STEP: f32 = 1.1; // scale factor per wheel notch

// Rendering
pub const MARKER_SIZE: f32 = 0.08; // billboard edge length for a bird marker
pub const MAX_INSTANCES: usize = 64;
pub const CLEAR_COLOR: [f64; 3] = [0.04, 0.05, 0.07];

// Audio: clamp applied to per-frame gains
pub const GAIN_FLOOR_DB: f32 = -100.0;
pub const GAIN_CEIL_DB: f32 = 0.0;

pub const ASSETS_ENV: &str = "AVIARY_ASSETS";
pub const DEFAULT_ASSETS_DIR: &str = "assets";
