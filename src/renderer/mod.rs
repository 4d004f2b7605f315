//! Software rendering module
//!
//! Everything is drawn on the CPU into an RGBA8 surface; presenting the
//! frame is left to the platform layer.

pub mod pixel;
pub mod scene;
pub mod shapes;
pub mod surface;

pub use pixel::{Image, Rgba, colors};
pub use scene::{draw_backdrop, draw_session};
pub use surface::Surface;
