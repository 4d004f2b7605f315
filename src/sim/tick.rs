//! Per-frame simulation step
//!
//! Order within a frame: road scroll, player steering, spawning, obstacle
//! motion and scoring, pickups, then collision.

use rand::Rng;

use super::collision::collide;
use super::obstacle::PursuitContext;
use super::powerup::PowerUp;
use super::state::{GameEvent, GameState};

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// −1 left, +1 right, 0 none
    pub steer: f32,
    /// Let the built-in driver steer
    pub autopilot: bool,
}

impl TickInput {
    pub fn from_keys(left: bool, right: bool) -> Self {
        let mut steer = 0.0;
        if left {
            steer -= 1.0;
        }
        if right {
            steer += 1.0;
        }
        Self {
            steer,
            autopilot: false,
        }
    }
}

/// Advance the session by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.crashed {
        return;
    }
    state.elapsed += dt;
    let screen_h = state.config.screen.height as f32;

    state.road.update(dt, screen_h);

    let steer = if input.autopilot {
        autopilot_steer(state)
    } else {
        input.steer.clamp(-1.0, 1.0)
    };
    state
        .player
        .steer(steer, dt, state.effects.player_speed_mult());

    // Spawning
    if let Some(obstacle) =
        state
            .spawner
            .update(dt, &state.difficulty, &state.lanes, &mut state.rng)
    {
        state.events.push(GameEvent::ObstacleSpawned {
            kind: obstacle.kind,
            police: obstacle.is_police(),
        });
        state.obstacles.push(obstacle);

        let pcfg = &state.config.powerups;
        if pcfg.enabled && state.rng.random_bool(pcfg.spawn_chance.clamp(0.0, 1.0)) {
            let powerup = PowerUp::spawn(&mut state.rng, &state.lanes, pcfg.size, pcfg.fall_speed);
            log::debug!("Power-up {} spawned", powerup.kind.as_str());
            state.events.push(GameEvent::PowerUpSpawned { kind: powerup.kind });
            state.powerups.push(powerup);
        }
    }

    // Obstacles
    let ctx = PursuitContext {
        lanes: &state.lanes,
        player_center_x: Some(state.player.center_x()),
        level: state.difficulty.level,
        initial_speed: state.config.obstacles.initial_speed,
        screen_height: screen_h,
        config: &state.config.police,
    };
    let fall_mult = state.effects.obstacle_speed_mult();
    for obstacle in &mut state.obstacles {
        obstacle.update(dt, fall_mult, &ctx, &mut state.rng);
    }

    let before = state.obstacles.len();
    state.obstacles.retain(|o| !o.is_off_screen(screen_h));
    let passed = (before - state.obstacles.len()) as u32;
    if passed > 0 {
        let old = state.score;
        state.score += passed * state.effects.points_mult().max(1);
        state.events.push(GameEvent::ScoreChanged { score: state.score });
        let gained = state
            .difficulty
            .on_score(old, state.score, &state.config.spawner);
        for i in 0..gained {
            state.events.push(GameEvent::LevelUp {
                level: state.difficulty.level - gained + 1 + i,
            });
        }
    }

    // Pickups
    for kind in state.effects.update(dt) {
        state.events.push(GameEvent::PowerUpExpired { kind });
    }
    let magnet = state.effects.magnet_radius().map(|radius| {
        (
            state.player_center(),
            radius,
            state.config.powerups.magnet_pull_speed,
        )
    });
    let player_rect = state.player.body.rect();
    let mut collected = Vec::new();
    state.powerups.retain_mut(|p| {
        p.update(dt, magnet);
        if p.rect().intersects(&player_rect) {
            collected.push(p.kind);
            false
        } else {
            !p.is_off_screen(screen_h)
        }
    });
    for kind in collected {
        log::debug!("Power-up {} collected", kind.as_str());
        state.effects.activate(kind);
        state.events.push(GameEvent::PowerUpCollected { kind });
    }

    // Collision
    if !state.effects.immune() {
        let hit = state
            .obstacles
            .iter()
            .any(|o| collide(&state.player.body, &o.body, &state.config.collision));
        if hit {
            log::info!("Collision at score {}", state.score);
            state.crashed = true;
            state.events.push(GameEvent::Collision { score: state.score });
        }
    }
}

/// Steer toward the lane whose closest oncoming car is farthest away
pub fn autopilot_steer(state: &GameState) -> f32 {
    let lanes = &state.lanes;
    let player = &state.player.body;
    let player_top = player.pos.y;

    // Per lane: lowest bottom edge of any car still above the player's bumper
    let mut danger = vec![f32::NEG_INFINITY; lanes.count()];
    for obstacle in &state.obstacles {
        let bottom = obstacle.body.pos.y + obstacle.body.height() as f32;
        if bottom > player_top + player.height() as f32 {
            continue;
        }
        let mut occupied = vec![lanes.nearest_lane(obstacle.body.center_x())];
        if let Some(police) = obstacle.police() {
            occupied.push(police.current_lane);
        }
        for lane in occupied {
            danger[lane] = danger[lane].max(bottom);
        }
    }

    let current = lanes.nearest_lane(state.player.center_x());
    let mut best = current;
    for lane in 0..lanes.count() {
        let closer = (lane as i64 - current as i64).abs() < (best as i64 - current as i64).abs();
        if danger[lane] < danger[best] || (danger[lane] == danger[best] && closer) {
            best = lane;
        }
    }

    let diff = lanes.center(best) as f32 - state.player.center_x();
    if diff.abs() <= 4.0 { 0.0 } else { diff.signum() }
}
