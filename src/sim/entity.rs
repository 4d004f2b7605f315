//! Entity bodies, sprite fitting, and the player car

use std::rc::Rc;

use glam::Vec2;

use super::lanes::LaneSet;
use super::mask::CollisionMask;
use crate::assets::SpriteHandle;
use crate::renderer::Image;
use crate::settings::{GameConfig, PlayerConfig};

/// Integer rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Strict overlap; empty rectangles never intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Shrink about the centre by fractions of the width and height
    pub fn shrink(&self, frac_w: f32, frac_h: f32) -> Rect {
        let dw = (self.w as f32 * frac_w) as i32;
        let dh = (self.h as f32 * frac_h) as i32;
        Rect {
            x: self.x + dw / 2,
            y: self.y + dh / 2,
            w: (self.w - dw).max(0),
            h: (self.h - dh).max(0),
        }
    }
}

/// A sprite scaled for one entity kind, with its collision mask
#[derive(Debug, Clone)]
pub struct FittedSprite {
    pub image: Rc<Image>,
    pub mask: Rc<CollisionMask>,
}

impl FittedSprite {
    /// Scale `source` to `target_height` preserving aspect ratio, then shrink
    /// proportionally if it would not fit in a lane with `margin` on each side.
    pub fn fit(
        source: &SpriteHandle,
        target_height: u32,
        lane_width: i32,
        margin: u32,
        alpha_threshold: u8,
    ) -> Self {
        let (w, h) = fit_size(
            source.width(),
            source.height(),
            target_height,
            lane_width,
            margin,
        );
        let image = source.resize_bilinear(w, h);
        let mask = CollisionMask::from_image(&image, alpha_threshold);
        Self {
            image: Rc::new(image),
            mask: Rc::new(mask),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Target size for a sprite of `ow`×`oh`
pub fn fit_size(ow: u32, oh: u32, target_height: u32, lane_width: i32, margin: u32) -> (u32, u32) {
    if ow == 0 || oh == 0 {
        return (0, 0);
    }
    let scale = target_height as f64 / oh as f64;
    let mut w = (ow as f64 * scale) as u32;
    let mut h = target_height;

    let max_w = (lane_width - 2 * margin as i32).max(10) as u32;
    if w > max_w {
        h = (h as u64 * max_w as u64 / w as u64) as u32;
        w = max_w;
    }
    (w, h)
}

/// Positioned sprite with its mask
#[derive(Debug, Clone)]
pub struct Body {
    /// Top-left corner
    pub pos: Vec2,
    pub sprite: FittedSprite,
}

impl Body {
    pub fn new(pos: Vec2, sprite: FittedSprite) -> Self {
        Self { pos, sprite }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.sprite.width() as i32
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.sprite.height() as i32
    }

    #[inline]
    pub fn mask(&self) -> &CollisionMask {
        &self.sprite.mask
    }

    /// Horizontal midpoint
    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + (self.width() / 2) as f32
    }

    /// Bounding rectangle at the truncated position
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x as i32,
            self.pos.y as i32,
            self.width(),
            self.height(),
        )
    }
}

/// The player-controlled car
#[derive(Debug, Clone)]
pub struct Player {
    pub body: Body,
    /// Horizontal speed (px/s)
    pub speed: f32,
    min_x: f32,
    max_x: f32,
}

impl Player {
    /// Place the car centred on the drivable span, near the bottom edge
    pub fn new(sprite: FittedSprite, lanes: &LaneSet, config: &GameConfig) -> Self {
        let PlayerConfig {
            speed,
            bottom_margin,
            ..
        } = config.player;
        let bounds = lanes.bounds();
        let w = sprite.width() as i32;
        let h = sprite.height() as f32;
        let x = bounds.inner_x + bounds.inner_w / 2 - w / 2;
        let y = config.screen.height as f32 - h - bottom_margin;

        let min_x = bounds.inner_x as f32;
        let max_x = (bounds.right() - w) as f32;
        Self {
            body: Body::new(Vec2::new(x as f32, y), sprite),
            speed,
            min_x,
            max_x: max_x.max(min_x),
        }
    }

    /// Move by `direction` (−1 left, +1 right) for `dt` seconds, clamped to the road
    pub fn steer(&mut self, direction: f32, dt: f32, speed_mult: f32) {
        self.body.pos.x += direction * self.speed * speed_mult * dt;
        self.body.pos.x = self.body.pos.x.clamp(self.min_x, self.max_x);
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.body.center_x()
    }
}
