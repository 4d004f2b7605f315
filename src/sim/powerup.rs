//! Falling pickups and their timed effects

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::entity::Rect;
use super::lanes::LaneSet;
use crate::renderer::Rgba;

/// Magnet pull radius (px)
pub const MAGNET_RADIUS: f32 = 150.0;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    SpeedBoost,
    SlowMotion,
    Magnet,
    DoublePoints,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Shield,
        PowerUpKind::SpeedBoost,
        PowerUpKind::SlowMotion,
        PowerUpKind::Magnet,
        PowerUpKind::DoublePoints,
    ];

    /// Effect duration (s)
    pub fn duration(&self) -> f32 {
        match self {
            PowerUpKind::Shield => 5.0,
            PowerUpKind::SpeedBoost => 3.0,
            PowerUpKind::SlowMotion => 4.0,
            PowerUpKind::Magnet => 6.0,
            PowerUpKind::DoublePoints => 8.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::SpeedBoost => "speed_boost",
            PowerUpKind::SlowMotion => "slow_motion",
            PowerUpKind::Magnet => "magnet",
            PowerUpKind::DoublePoints => "double_points",
        }
    }

    pub fn color(&self) -> Rgba {
        match self {
            PowerUpKind::Shield => Rgba::opaque(0, 150, 255),
            PowerUpKind::SpeedBoost => Rgba::opaque(255, 200, 0),
            PowerUpKind::SlowMotion => Rgba::opaque(150, 0, 255),
            PowerUpKind::Magnet => Rgba::opaque(255, 0, 150),
            PowerUpKind::DoublePoints => Rgba::opaque(0, 255, 100),
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// A pickup falling down a lane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: u32,
    pub speed: f32,
}

impl PowerUp {
    /// Random kind centred on a random lane, just above the screen
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, lanes: &LaneSet, size: u32, speed: f32) -> Self {
        let kind = PowerUpKind::ALL
            .choose(rng)
            .copied()
            .unwrap_or(PowerUpKind::Shield);
        let lane = rng.random_range(0..lanes.count());
        let x = (lanes.center(lane) - (size / 2) as i32) as f32;
        Self {
            kind,
            pos: Vec2::new(x, -(size as f32)),
            size,
            speed,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size as f32 / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x as i32,
            self.pos.y as i32,
            self.size as i32,
            self.size as i32,
        )
    }

    /// Fall, then drift toward `magnet` (target, radius, pull speed) when in range
    pub fn update(&mut self, dt: f32, magnet: Option<(Vec2, f32, f32)>) {
        self.pos.y += self.speed * dt;
        if let Some((target, radius, pull)) = magnet {
            let delta = target - self.center();
            let dist = delta.length();
            if dist < radius && dist > 0.0 {
                let step = (pull * dt).min(dist);
                self.pos += delta / dist * step;
            }
        }
    }

    pub fn is_off_screen(&self, screen_height: f32) -> bool {
        self.pos.y > screen_height
    }
}

/// Remaining time of every active effect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    remaining: [f32; 5],
}

impl ActiveEffects {
    /// Start (or refresh) an effect for its full duration
    pub fn activate(&mut self, kind: PowerUpKind) {
        self.remaining[kind.index()] = kind.duration();
    }

    /// Count down; returns effects that ran out this step
    pub fn update(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let slot = &mut self.remaining[kind.index()];
            if *slot > 0.0 {
                *slot -= dt;
                if *slot <= 0.0 {
                    *slot = 0.0;
                    expired.push(kind);
                }
            }
        }
        expired
    }

    pub fn clear(&mut self) {
        self.remaining = [0.0; 5];
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.remaining[kind.index()] > 0.0
    }

    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        self.remaining[kind.index()]
    }

    pub fn active(&self) -> impl Iterator<Item = PowerUpKind> + '_ {
        PowerUpKind::ALL.into_iter().filter(|k| self.is_active(*k))
    }

    pub fn player_speed_mult(&self) -> f32 {
        if self.is_active(PowerUpKind::SpeedBoost) { 1.5 } else { 1.0 }
    }

    pub fn obstacle_speed_mult(&self) -> f32 {
        if self.is_active(PowerUpKind::SlowMotion) { 0.5 } else { 1.0 }
    }

    pub fn points_mult(&self) -> u32 {
        if self.is_active(PowerUpKind::DoublePoints) { 2 } else { 1 }
    }

    /// Collisions are ignored while shielded
    pub fn immune(&self) -> bool {
        self.is_active(PowerUpKind::Shield)
    }

    pub fn magnet_radius(&self) -> Option<f32> {
        self.is_active(PowerUpKind::Magnet).then_some(MAGNET_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::sim::road::RoadBounds;

    #[test]
    fn test_effects_combine() {
        let mut fx = ActiveEffects::default();
        assert_eq!(fx.player_speed_mult(), 1.0);
        assert_eq!(fx.points_mult(), 1);
        assert!(!fx.immune());
        assert_eq!(fx.magnet_radius(), None);

        for kind in PowerUpKind::ALL {
            fx.activate(kind);
        }
        assert_eq!(fx.player_speed_mult(), 1.5);
        assert_eq!(fx.obstacle_speed_mult(), 0.5);
        assert_eq!(fx.points_mult(), 2);
        assert!(fx.immune());
        assert_eq!(fx.magnet_radius(), Some(150.0));
        assert_eq!(fx.active().count(), 5);
    }

    #[test]
    fn test_effects_expire_in_duration_order() {
        let mut fx = ActiveEffects::default();
        for kind in PowerUpKind::ALL {
            fx.activate(kind);
        }
        let mut order = Vec::new();
        for _ in 0..100 {
            order.extend(fx.update(0.1));
        }
        assert_eq!(
            order,
            vec![
                PowerUpKind::SpeedBoost,
                PowerUpKind::SlowMotion,
                PowerUpKind::Shield,
                PowerUpKind::Magnet,
                PowerUpKind::DoublePoints,
            ]
        );
        assert_eq!(fx.active().count(), 0);
    }

    #[test]
    fn test_repickup_refreshes() {
        let mut fx = ActiveEffects::default();
        fx.activate(PowerUpKind::Shield);
        fx.update(4.0);
        fx.activate(PowerUpKind::Shield);
        assert_eq!(fx.remaining(PowerUpKind::Shield), 5.0);
        assert!(fx.update(4.9).is_empty());
        assert_eq!(fx.update(0.2), vec![PowerUpKind::Shield]);
    }

    #[test]
    fn test_spawn_on_lane() {
        let lanes = LaneSet::new(RoadBounds { inner_x: 400, inner_w: 480 }, 3);
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..20 {
            let p = PowerUp::spawn(&mut rng, &lanes, 60, 280.0);
            assert_eq!(p.pos.y, -60.0);
            assert!(lanes.centers().contains(&(p.center().x as i32)));
        }
    }

    #[test]
    fn test_magnet_pulls_within_radius() {
        let mut p = PowerUp {
            kind: PowerUpKind::Shield,
            pos: Vec2::new(0.0, 0.0),
            size: 60,
            speed: 0.0,
        };
        let player = Vec2::new(130.0, 30.0);
        p.update(0.1, Some((player, 150.0, 300.0)));
        assert!((p.center().x - 60.0).abs() < 1e-3);

        // Out of range: no pull
        let far = Vec2::new(1000.0, 30.0);
        p.update(0.1, Some((far, 150.0, 300.0)));
        assert!((p.center().x - 60.0).abs() < 1e-3);

        // Never overshoots the target
        p.update(10.0, Some((player, 150.0, 300.0)));
        assert!((p.center() - player).length() < 1e-3);
    }
}
