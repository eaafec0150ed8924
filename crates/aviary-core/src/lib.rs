pub mod assets;
pub mod attenuation;
pub mod catalog;
pub mod constants;
pub mod controller;
pub mod gesture;
pub mod input;
pub mod registry;
pub mod scene;
pub mod state;
pub mod updater;

pub use assets::*;
pub use attenuation::*;
pub use catalog::*;
pub use constants::*;
pub use controller::*;
pub use gesture::*;
pub use registry::*;
pub use scene::*;
pub use state::*;
pub use updater::*;
