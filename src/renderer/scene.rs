//! Drawing a play session onto a surface

use glam::Vec2;

use super::pixel::{Rgba, colors};
use super::shapes::{arrow, fill_circle};
use super::surface::Surface;
use crate::sim::{Body, GameState};

/// Road, player, obstacles, pickups and the level strip
pub fn draw_session(surface: &mut Surface, state: &GameState) {
    surface.clear(colors::GRASS);

    let road = &state.road;
    surface.blit(&road.texture, road.x, road.y1 as i32);
    surface.blit(&road.texture, road.x, road.y2 as i32);

    for powerup in &state.powerups {
        let radius = powerup.size as f32 / 2.0;
        fill_circle(surface.image_mut(), powerup.center(), radius, powerup.kind.color());
        fill_circle(
            surface.image_mut(),
            powerup.center(),
            radius * 0.5,
            Rgba::new(255, 255, 255, 120),
        );
    }

    let player = &state.player.body;
    surface.blit(&player.sprite.image, player.pos.x as i32, player.pos.y as i32);
    if state.effects.immune() {
        let r = player.height().max(player.width()) as f32 * 0.6;
        fill_circle(surface.image_mut(), state.player_center(), r, Rgba::new(0, 150, 255, 60));
    }

    for obstacle in &state.obstacles {
        let body = &obstacle.body;
        let (x, y) = (body.pos.x as i32, body.pos.y as i32);
        let Some(police) = obstacle.police() else {
            surface.blit(&body.sprite.image, x, y);
            continue;
        };
        if police.siren_on() {
            surface.blit_tinted(&body.sprite.image, x, y, colors::SIREN);
        } else {
            surface.blit(&body.sprite.image, x, y);
        }
        let beacon = colors::BEACON[police.siren_frame(colors::BEACON.len())];
        fill_circle(surface.image_mut(), beacon_center(body), 6.0, beacon);
        if police.moving_lateral {
            let center = Vec2::new(body.center_x(), body.pos.y - 12.0);
            let right = police.target_lane_x > body.pos.x;
            arrow(surface.image_mut(), center, 20.0, right, colors::LANE_ARROW);
        }
    }

    draw_level_strip(surface, state.difficulty.level);
}

fn beacon_center(body: &Body) -> Vec2 {
    Vec2::new(body.center_x(), body.pos.y + body.height() as f32 * 0.5)
}

/// One pip per difficulty level along the top-left edge
fn draw_level_strip(surface: &mut Surface, level: u32) {
    for i in 0..level.min(20) as i32 {
        surface.fill_rect(10 + i * 14, 10, 10, 10, Rgba::opaque(255, 255, 255));
    }
}

/// Solid backdrop with an optional progress bar along the bottom
pub fn draw_backdrop(surface: &mut Surface, color: Rgba, progress: Option<f32>) {
    surface.clear(color);
    if let Some(p) = progress {
        let w = (surface.width() as f32 * p.clamp(0.0, 1.0)) as i32;
        let y = surface.height() as i32 - 6;
        surface.fill_rect(0, y, w, 6, Rgba::opaque(200, 200, 200));
    }
}
