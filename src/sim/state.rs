//! Play-session state
//!
//! Everything a running session owns lives here: the scrolling road, lane
//! geometry, the player, obstacles, pickups, difficulty and the seeded RNG.
//! Only the tick mutates it, and only from the main loop.

use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{FittedSprite, Player};
use super::lanes::LaneSet;
use super::obstacle::Obstacle;
use super::powerup::{ActiveEffects, PowerUp, PowerUpKind};
use super::road::{RoadBounds, detect_asphalt_bounds};
use super::spawner::{Difficulty, Spawner};
use crate::assets::{AssetRegistry, SpriteHandle, SpriteKind};
use crate::error::Result;
use crate::renderer::Image;
use crate::settings::GameConfig;

/// Things that happened during a tick, drained by the game loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ObstacleSpawned { kind: SpriteKind, police: bool },
    /// An obstacle left the bottom of the screen
    ScoreChanged { score: u32 },
    LevelUp { level: u32 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    /// Player hit an obstacle without a shield
    Collision { score: u32 },
}

/// Two stacked copies of the road texture scrolling downward
#[derive(Debug, Clone)]
pub struct RoadScroll {
    pub texture: SpriteHandle,
    /// Screen x of the texture's left edge
    pub x: i32,
    pub y1: f32,
    pub y2: f32,
    /// Scroll speed (px/s)
    pub speed: f32,
    initial_speed: f32,
    accel: f32,
}

impl RoadScroll {
    pub fn new(texture: SpriteHandle, x: i32, initial_speed: f32, accel: f32) -> Self {
        let tile = texture.height() as f32;
        Self {
            texture,
            x,
            y1: 0.0,
            y2: -tile,
            speed: initial_speed,
            initial_speed,
            accel,
        }
    }

    #[inline]
    pub fn tile_height(&self) -> f32 {
        self.texture.height() as f32
    }

    /// Scroll both copies, wrapping one above the other once it leaves the screen
    pub fn update(&mut self, dt: f32, screen_height: f32) {
        let tile = self.tile_height();
        self.y1 += self.speed * dt;
        self.y2 += self.speed * dt;
        if self.y1 >= screen_height {
            self.y1 = self.y2 - tile;
        }
        if self.y2 >= screen_height {
            self.y2 = self.y1 - tile;
        }
        self.speed += self.accel * dt;
    }

    pub fn reset(&mut self) {
        self.y1 = 0.0;
        self.y2 = -self.tile_height();
        self.speed = self.initial_speed;
    }
}

/// Scale the road texture to its on-screen width and centre it
pub fn prepare_road(texture: &Image, config: &GameConfig) -> (Image, i32) {
    let screen_w = config.screen.width;
    let max_w = (screen_w as f32 * config.road.width_fraction) as u32;
    let road_w = texture.width().min(max_w).max(1);
    let scaled = texture.resize_bilinear(road_w, texture.height());
    let road_x = (screen_w as i32 - road_w as i32) / 2;
    (scaled, road_x)
}

/// Complete play-session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub config: GameConfig,
    pub road: RoadScroll,
    pub bounds: RoadBounds,
    pub lanes: LaneSet,
    pub player: Player,
    /// Unordered; removed when off screen
    pub obstacles: Vec<Obstacle>,
    pub powerups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    pub spawner: Spawner,
    pub difficulty: Difficulty,
    pub score: u32,
    /// Seconds since the session started
    pub elapsed: f32,
    /// Set by a fatal collision; the tick is a no-op afterwards
    pub crashed: bool,
    pub events: Vec<GameEvent>,
    player_sprite: FittedSprite,
}

impl GameState {
    /// Analyse the road, fit sprites and place the player.
    ///
    /// Fails when any required sprite is missing from `assets`.
    pub fn new(config: &GameConfig, assets: &dyn AssetRegistry, seed: u64) -> Result<Self> {
        let road_texture = assets.load(SpriteKind::Road)?;
        let (road_img, road_x) = prepare_road(&road_texture, config);
        let bounds = detect_asphalt_bounds(&road_img, road_x, &config.detector);
        let lanes = LaneSet::new(bounds, config.lanes.count);
        log::info!(
            "Road at x={} ({} px), asphalt {}..{}, lane width {}",
            road_x,
            road_img.width(),
            bounds.inner_x,
            bounds.right(),
            lanes.lane_width()
        );

        let player_sprite = FittedSprite::fit(
            &assets.load(SpriteKind::Player)?,
            config.player.target_height,
            lanes.lane_width(),
            config.lanes.margin,
            config.collision.alpha_threshold,
        );
        let player = Player::new(player_sprite.clone(), &lanes, config);
        let spawner = Spawner::new(assets, &lanes, config)?;

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config: config.clone(),
            road: RoadScroll::new(
                Rc::new(road_img),
                road_x,
                config.road.initial_speed,
                config.road.accel,
            ),
            bounds,
            lanes,
            player,
            obstacles: Vec::new(),
            powerups: Vec::new(),
            effects: ActiveEffects::default(),
            spawner,
            difficulty: Difficulty::new(config.obstacles.initial_speed),
            score: 0,
            elapsed: 0.0,
            crashed: false,
            events: Vec::new(),
            player_sprite,
        })
    }

    /// Start a fresh run on the same road; the RNG keeps its stream
    pub fn reset(&mut self) {
        self.player = Player::new(self.player_sprite.clone(), &self.lanes, &self.config);
        self.obstacles.clear();
        self.powerups.clear();
        self.effects.clear();
        self.spawner.reset();
        self.difficulty = Difficulty::new(self.config.obstacles.initial_speed);
        self.score = 0;
        self.elapsed = 0.0;
        self.crashed = false;
        self.events.clear();
        self.road.reset();
    }

    /// Player centre used by the magnet
    pub fn player_center(&self) -> Vec2 {
        let body = &self.player.body;
        Vec2::new(body.center_x(), body.pos.y + body.height() as f32 / 2.0)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
