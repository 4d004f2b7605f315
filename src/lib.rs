//! Road Dodger - A lane-based arcade driving game
//!
//! Core modules:
//! - `sim`: Simulation (road detection, lanes, collisions, entities, spawning)
//! - `game`: Screen state machine (menu, cinematic, playing, game over, help)
//! - `renderer`: Software RGBA surface and sprite blitting
//! - `assets`: Sprite registry populated once at start-up
//! - `audio`: Audio output capability and playlist management
//! - `platform`: Keyboard snapshot and frame clock
//! - `record`: Best-score persistence

pub mod assets;
pub mod audio;
pub mod error;
pub mod game;
pub mod platform;
pub mod record;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{GameError, Result};
pub use game::{Game, Screen};
pub use record::RecordManager;
pub use settings::GameConfig;

/// Game configuration constants that are not tunable at runtime
pub mod consts {
    /// Target frame rate of the main loop
    pub const FPS: u32 = 60;
    /// Maximum simulation step, avoids teleporting on frame hitches
    pub const MAX_DT: f32 = 0.05;

    /// Default render surface resolution
    pub const SCREEN_WIDTH: u32 = 1280;
    pub const SCREEN_HEIGHT: u32 = 720;

    /// Numerical guard for divisions by a pixel maximum
    pub const EPSILON: f32 = 1e-6;
}

/// Clamp a raw frame delta into the simulation's accepted range
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, consts::MAX_DT)
    } else {
        0.0
    }
}
