//! Game rules and tuning
//!
//! Every threshold the simulation reads lives here. The struct is built once
//! (defaults or a JSON file), validated, and passed by reference to
//! constructors so tests can override individual values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::{GameError, Result};

/// Collision strategy used for game-over detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollisionMode {
    /// Shrunken bounding rectangles
    Shrink,
    /// Per-pixel opacity masks
    #[default]
    Mask,
}

impl CollisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionMode::Shrink => "shrink",
            CollisionMode::Mask => "mask",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "shrink" | "rect" => Some(CollisionMode::Shrink),
            "mask" | "pixel" => Some(CollisionMode::Mask),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Sprite height before lane clipping (px)
    pub target_height: u32,
    /// Horizontal speed (px/s)
    pub speed: f32,
    /// Gap between the car and the bottom edge (px)
    pub bottom_margin: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            target_height: 90,
            speed: 380.0,
            bottom_margin: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    pub count: usize,
    /// Lateral slack kept inside each lane (px per side)
    pub margin: u32,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self { count: 3, margin: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub target_height: u32,
    /// Fall speed at level 1 (px/s)
    pub initial_speed: f32,
    /// Probability that a new obstacle is a police car
    pub police_spawn_chance: f64,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            target_height: 90,
            initial_speed: 280.0,
            police_spawn_chance: 0.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub mode: CollisionMode,
    /// Fraction of width removed in shrink mode
    pub shrink_w: f32,
    /// Fraction of height removed in shrink mode
    pub shrink_h: f32,
    /// Minimum alpha for a pixel to be part of a mask
    pub alpha_threshold: u8,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            mode: CollisionMode::Mask,
            shrink_w: 0.15,
            shrink_h: 0.18,
            alpha_threshold: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoliceConfig {
    /// Lateral speed while changing lanes (px/s)
    pub lateral_speed: f32,
    /// Base time between lane-change decisions (s)
    pub lane_change_interval: f32,
    /// Shorten the interval as the difficulty level rises
    pub aggressive: bool,
    /// Interval reduction per level above 1 (s)
    pub interval_step_per_level: f32,
    /// Floor of the level-adjusted interval (s)
    pub min_level_interval: f32,
    /// Floor of the speed-adjusted interval (s)
    pub min_interval: f32,
    /// Screen-height fraction below which pursuit activates
    pub activation_fraction: f32,
    /// Activation fraction once the speed ratio exceeds `high_speed_ratio`
    pub high_speed_activation_fraction: f32,
    pub high_speed_ratio: f32,
    /// Speed ratio above which lateral speed scales with fall speed
    pub lateral_boost_ratio: f32,
}

impl Default for PoliceConfig {
    fn default() -> Self {
        Self {
            lateral_speed: 120.0,
            lane_change_interval: 1.5,
            aggressive: true,
            interval_step_per_level: 0.15,
            min_level_interval: 0.3,
            min_interval: 0.2,
            activation_fraction: 0.5,
            high_speed_activation_fraction: 0.7,
            high_speed_ratio: 2.0,
            lateral_boost_ratio: 1.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    pub initial_interval: f32,
    /// Interval reduction applied after every spawn (s)
    pub interval_step: f32,
    pub min_interval: f32,
    /// Score step between difficulty levels
    pub points_per_level: u32,
    /// Obstacle speed gained per level (px/s)
    pub speed_step: f32,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            initial_interval: 0.7,
            interval_step: 0.02,
            min_interval: 0.35,
            points_per_level: 10,
            speed_step: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Road width as a fraction of the screen, capped by the texture width
    pub width_fraction: f32,
    /// Initial scroll speed (px/s)
    pub initial_speed: f32,
    /// Scroll acceleration while playing (px/s²)
    pub accel: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            width_fraction: 0.4,
            initial_speed: 200.0,
            accel: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    pub dir: PathBuf,
    /// Menu theme, looped while the menu is shown
    pub menu_theme: Option<PathBuf>,
    pub volume: f32,
    /// Fade-out length when the playlist is stopped (s)
    pub fade_time: f32,
    /// Raise the volume with the difficulty level
    pub aggressive_volume: bool,
    pub volume_per_level: f32,
    /// Step for manual volume up/down
    pub volume_step: f32,
    pub extensions: Vec<String>,
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/sounds/playlist"),
            menu_theme: Some(PathBuf::from("assets/sounds/abertura.mp3")),
            volume: 0.2,
            fade_time: 1.0,
            aggressive_volume: false,
            volume_per_level: 0.05,
            volume_step: 0.1,
            extensions: vec!["mp3".into(), "wav".into(), "ogg".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub enabled: bool,
    /// Probability of a pickup accompanying each obstacle spawn
    pub spawn_chance: f64,
    pub size: u32,
    pub fall_speed: f32,
    /// Speed at which an active magnet pulls pickups (px/s)
    pub magnet_pull_speed: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_chance: 0.08,
            size: 60,
            fall_speed: 280.0,
            magnet_pull_speed: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Textures wider than this are downscaled before analysis
    pub max_width: u32,
    /// Vertical sample band as fractions of the texture height
    pub band_top: f32,
    pub band_bottom: f32,
    pub max_saturation: f32,
    pub max_value: f32,
    /// Window of the morphological closing pass (odd)
    pub closing_window: usize,
    /// Span used when no asphalt run is found
    pub fallback_left: f32,
    pub fallback_right: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_width: 256,
            band_top: 0.30,
            band_bottom: 0.70,
            max_saturation: 0.40,
            max_value: 0.65,
            closing_window: 5,
            fallback_left: 0.15,
            fallback_right: 0.85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CinematicConfig {
    /// Intro clip; the cinematic screen is skipped when absent
    pub video: Option<PathBuf>,
    /// Screen time before the game starts on its own (s)
    pub duration: f32,
}

impl Default for CinematicConfig {
    fn default() -> Self {
        Self {
            video: Some(PathBuf::from("assets/videos/intro.mp4")),
            duration: 10.0,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub lanes: LaneConfig,
    pub obstacles: ObstacleConfig,
    pub collision: CollisionConfig,
    pub police: PoliceConfig,
    pub spawner: SpawnerConfig,
    pub road: RoadConfig,
    pub playlist: PlaylistConfig,
    pub powerups: PowerUpConfig,
    pub detector: DetectorConfig,
    pub cinematic: CinematicConfig,
    /// Flat file holding the best score
    pub record_file: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            player: PlayerConfig::default(),
            lanes: LaneConfig::default(),
            obstacles: ObstacleConfig::default(),
            collision: CollisionConfig::default(),
            police: PoliceConfig::default(),
            spawner: SpawnerConfig::default(),
            road: RoadConfig::default(),
            playlist: PlaylistConfig::default(),
            powerups: PowerUpConfig::default(),
            detector: DetectorConfig::default(),
            cinematic: CinematicConfig::default(),
            record_file: PathBuf::from("record.txt"),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        let config: GameConfig =
            serde_json::from_str(&text).map_err(|source| GameError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|e| GameError::io(path, e))
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(GameError::invalid_config("screen", "dimensions must be non-zero"));
        }
        if self.lanes.count == 0 {
            return Err(GameError::invalid_config("lanes.count", "at least one lane"));
        }
        if self.player.target_height == 0 || self.obstacles.target_height == 0 {
            return Err(GameError::invalid_config(
                "target_height",
                "sprite heights must be non-zero",
            ));
        }
        if self.obstacles.initial_speed <= 0.0 {
            return Err(GameError::invalid_config(
                "obstacles.initial_speed",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.obstacles.police_spawn_chance) {
            return Err(GameError::invalid_config(
                "obstacles.police_spawn_chance",
                "must be a probability",
            ));
        }
        if !(0.0..=1.0).contains(&self.powerups.spawn_chance) {
            return Err(GameError::invalid_config(
                "powerups.spawn_chance",
                "must be a probability",
            ));
        }
        if self.spawner.min_interval <= 0.0 || self.spawner.initial_interval <= 0.0 {
            return Err(GameError::invalid_config(
                "spawner",
                "spawn intervals must be positive",
            ));
        }
        if self.spawner.points_per_level == 0 {
            return Err(GameError::invalid_config(
                "spawner.points_per_level",
                "must be non-zero",
            ));
        }
        if self.police.min_interval <= 0.0 {
            return Err(GameError::invalid_config(
                "police.min_interval",
                "must be positive",
            ));
        }
        let d = &self.detector;
        if d.max_width == 0 || d.closing_window == 0 {
            return Err(GameError::invalid_config(
                "detector",
                "max_width and closing_window must be non-zero",
            ));
        }
        if !(0.0..1.0).contains(&d.band_top) || d.band_bottom <= d.band_top || d.band_bottom > 1.0
        {
            return Err(GameError::invalid_config(
                "detector.band",
                "band must satisfy 0 <= top < bottom <= 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.playlist.volume) {
            return Err(GameError::invalid_config("playlist.volume", "must be in [0, 1]"));
        }
        Ok(())
    }
}
