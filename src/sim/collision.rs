//! Collision tests between entity bodies
//!
//! Two strategies share one entry point: shrunken bounding rectangles, or
//! per-pixel masks compared at the integer offset between the two origins.
//! Both are pure, symmetric, and treat empty geometry as "no collision".

use super::entity::Body;
use crate::settings::{CollisionConfig, CollisionMode};

/// Shrunken-rectangle overlap
pub fn collide_shrink(a: &Body, b: &Body, frac_w: f32, frac_h: f32) -> bool {
    a.rect()
        .shrink(frac_w, frac_h)
        .intersects(&b.rect().shrink(frac_w, frac_h))
}

/// Pixel-mask overlap: a single shared opaque pixel collides
pub fn collide_mask(a: &Body, b: &Body) -> bool {
    let ra = a.rect();
    let rb = b.rect();
    if !ra.intersects(&rb) {
        return false;
    }
    let dx = rb.x.saturating_sub(ra.x);
    let dy = rb.y.saturating_sub(ra.y);
    a.mask().overlaps(b.mask(), dx, dy)
}

/// Collision test using the configured strategy
pub fn collide(a: &Body, b: &Body, config: &CollisionConfig) -> bool {
    match config.mode {
        CollisionMode::Shrink => collide_shrink(a, b, config.shrink_w, config.shrink_h),
        CollisionMode::Mask => collide_mask(a, b),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::renderer::{Image, Rgba};
    use crate::sim::entity::FittedSprite;
    use crate::sim::mask::CollisionMask;

    fn body_from_image(img: Image, x: f32, y: f32) -> Body {
        let mask = CollisionMask::from_image(&img, 50);
        Body::new(
            Vec2::new(x, y),
            FittedSprite {
                image: Rc::new(img),
                mask: Rc::new(mask),
            },
        )
    }

    fn solid(w: u32, h: u32, x: f32, y: f32) -> Body {
        body_from_image(Image::filled(w, h, Rgba::opaque(255, 255, 255)), x, y)
    }

    /// Opaque disc inscribed in a transparent square
    fn disc(size: u32, x: f32, y: f32) -> Body {
        let mut img = Image::transparent(size, size);
        let r = size as f32 / 2.0;
        for py in 0..size {
            for px in 0..size {
                let dx = px as f32 + 0.5 - r;
                let dy = py as f32 + 0.5 - r;
                if dx * dx + dy * dy <= r * r {
                    img.set(px, py, Rgba::opaque(0, 0, 255));
                }
            }
        }
        body_from_image(img, x, y)
    }

    #[test]
    fn test_mask_touching_pixels() {
        let a = solid(10, 10, 0.0, 0.0);
        let b = solid(10, 10, 9.0, 9.0);
        assert!(collide_mask(&a, &b));
        let c = solid(10, 10, 10.0, 0.0);
        assert!(!collide_mask(&a, &c));
    }

    #[test]
    fn test_mask_ignores_transparent_corners() {
        // Bounding boxes overlap at the corners, discs do not
        let a = disc(20, 0.0, 0.0);
        let b = disc(20, 17.0, 17.0);
        assert!(a.rect().intersects(&b.rect()));
        assert!(!collide_mask(&a, &b));
        let c = disc(20, 10.0, 0.0);
        assert!(collide_mask(&a, &c));
    }

    #[test]
    fn test_shrink_mode_forgives_edges() {
        let config = CollisionConfig {
            mode: CollisionMode::Shrink,
            ..Default::default()
        };
        let a = solid(100, 100, 0.0, 0.0);
        let b = solid(100, 100, 95.0, 0.0);
        assert!(collide_mask(&a, &b));
        assert!(!collide(&a, &b, &config));
        let c = solid(100, 100, 50.0, 50.0);
        assert!(collide(&a, &c, &config));
    }

    #[test]
    fn test_default_mode_is_mask() {
        let config = CollisionConfig::default();
        let a = disc(20, 0.0, 0.0);
        let b = disc(20, 17.0, 17.0);
        assert!(!collide(&a, &b, &config));
    }

    #[test]
    fn test_zero_size_never_collides() {
        let a = body_from_image(Image::transparent(0, 0), 5.0, 5.0);
        let b = solid(10, 10, 0.0, 0.0);
        assert!(!collide_mask(&a, &b));
        assert!(!collide_mask(&b, &a));
        assert!(!collide_shrink(&a, &b, 0.15, 0.18));
    }

    #[test]
    fn test_fractional_positions_follow_rects() {
        // Truncated origins 0 and 10: rectangles touch edge to edge only
        let a = solid(10, 10, 0.9, 0.0);
        let b = solid(10, 10, 10.5, 0.0);
        assert!(!a.rect().intersects(&b.rect()));
        assert!(!collide_mask(&a, &b));
    }

    fn pattern_body(w: u32, h: u32, seed: u64, x: f32, y: f32) -> Body {
        let mut img = Image::transparent(w, h);
        let mut s = seed | 1;
        for py in 0..h {
            for px in 0..w {
                s ^= s << 13;
                s ^= s >> 7;
                s ^= s << 17;
                if s % 3 == 0 {
                    img.set(px, py, Rgba::opaque(9, 9, 9));
                }
            }
        }
        body_from_image(img, x, y)
    }

    proptest! {
        #[test]
        fn prop_mask_collision_is_symmetric(
            (w1, h1, w2, h2) in (1u32..24, 1u32..24, 1u32..24, 1u32..24),
            seed1 in any::<u64>(),
            seed2 in any::<u64>(),
            x1 in -40.0f32..40.0, y1 in -40.0f32..40.0,
            x2 in -40.0f32..40.0, y2 in -40.0f32..40.0,
        ) {
            let a = pattern_body(w1, h1, seed1, x1, y1);
            let b = pattern_body(w2, h2, seed2, x2, y2);
            prop_assert_eq!(collide_mask(&a, &b), collide_mask(&b, &a));
            let shrink = CollisionConfig { mode: CollisionMode::Shrink, ..Default::default() };
            prop_assert_eq!(collide(&a, &b, &shrink), collide(&b, &a, &shrink));
        }

        #[test]
        fn prop_no_mask_hit_without_rect_overlap(
            (w1, h1, w2, h2) in (1u32..24, 1u32..24, 1u32..24, 1u32..24),
            x1 in -40.0f32..40.0, y1 in -40.0f32..40.0,
            x2 in -40.0f32..40.0, y2 in -40.0f32..40.0,
        ) {
            let a = solid(w1, h1, x1, y1);
            let b = solid(w2, h2, x2, y2);
            if !a.rect().intersects(&b.rect()) {
                prop_assert!(!collide_mask(&a, &b));
            } else {
                // Fully solid masks collide exactly when rectangles do
                prop_assert!(collide_mask(&a, &b));
            }
        }
    }
}
