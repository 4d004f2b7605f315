//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies
//! - Pixel data is read (sprites, masks), never drawn

pub mod collision;
pub mod entity;
pub mod lanes;
pub mod mask;
pub mod obstacle;
pub mod powerup;
pub mod road;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{collide, collide_mask, collide_shrink};
pub use entity::{Body, FittedSprite, Player, Rect};
pub use lanes::LaneSet;
pub use mask::CollisionMask;
pub use obstacle::{Obstacle, ObstacleVariant, PoliceState, PursuitContext};
pub use powerup::{ActiveEffects, PowerUp, PowerUpKind};
pub use road::{RoadBounds, detect_asphalt_bounds};
pub use spawner::{Difficulty, Spawner};
pub use state::{GameEvent, GameState, RoadScroll};
pub use tick::{TickInput, autopilot_steer, tick};
