//! Obstacle spawn cadence and the difficulty ramp

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::FittedSprite;
use super::lanes::LaneSet;
use super::obstacle::{Obstacle, choose_kind};
use crate::assets::{AssetRegistry, SpriteKind};
use crate::error::Result;
use crate::settings::{GameConfig, SpawnerConfig};

/// Level and obstacle speed, raised together every `points_per_level` points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: u32,
    /// Fall speed given to newly spawned obstacles (px/s)
    pub obstacle_speed: f32,
}

impl Difficulty {
    pub fn new(initial_speed: f32) -> Self {
        Self {
            level: 1,
            obstacle_speed: initial_speed,
        }
    }

    /// Apply a score change; returns how many levels were gained.
    ///
    /// One level per multiple of `points_per_level` crossed in `(old, new]`,
    /// so multi-point jumps never skip or double count a threshold.
    pub fn on_score(&mut self, old: u32, new: u32, cfg: &SpawnerConfig) -> u32 {
        let step = cfg.points_per_level.max(1);
        if new <= old {
            return 0;
        }
        let gained = new / step - old / step;
        if gained > 0 {
            self.level += gained;
            self.obstacle_speed += cfg.speed_step * gained as f32;
            log::info!(
                "Level {} reached, obstacle speed {:.0} px/s",
                self.level,
                self.obstacle_speed
            );
        }
        gained
    }
}

/// Timer-driven obstacle factory with pre-fitted sprites
#[derive(Debug, Clone)]
pub struct Spawner {
    timer: f32,
    interval: f32,
    config: SpawnerConfig,
    police_chance: f64,
    sprites: HashMap<SpriteKind, FittedSprite>,
}

impl Spawner {
    /// Fit every obstacle sprite to the lane width up front
    pub fn new(assets: &dyn AssetRegistry, lanes: &LaneSet, config: &GameConfig) -> Result<Self> {
        let mut sprites = HashMap::new();
        for kind in SpriteKind::OBSTACLES {
            let source = assets.load(kind)?;
            let fitted = FittedSprite::fit(
                &source,
                config.obstacles.target_height,
                lanes.lane_width(),
                config.lanes.margin,
                config.collision.alpha_threshold,
            );
            log::debug!("Obstacle sprite {kind} fitted to {}x{}", fitted.width(), fitted.height());
            sprites.insert(kind, fitted);
        }
        Ok(Self {
            timer: 0.0,
            interval: config.spawner.initial_interval,
            config: config.spawner.clone(),
            police_chance: config.obstacles.police_spawn_chance,
            sprites,
        })
    }

    /// Back to the first-spawn cadence; fitted sprites are kept
    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.interval = self.config.initial_interval;
    }

    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn sprite(&self, kind: SpriteKind) -> Option<&FittedSprite> {
        self.sprites.get(&kind)
    }

    /// Accumulate `dt`; spawn at most one obstacle when the interval elapses
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        difficulty: &Difficulty,
        lanes: &LaneSet,
        rng: &mut R,
    ) -> Option<Obstacle> {
        self.timer += dt;
        if self.timer < self.interval {
            return None;
        }
        self.timer = 0.0;
        self.interval = (self.interval - self.config.interval_step).max(self.config.min_interval);

        let kind = choose_kind(rng, self.police_chance);
        let lane = rng.random_range(0..lanes.count());
        let sprite = self.sprites.get(&kind)?.clone();
        Some(Obstacle::new(kind, sprite, lane, lanes, difficulty.obstacle_speed))
    }
}
