//! Binary opacity masks for pixel-exact collision

use crate::renderer::Image;

/// One bit per sprite pixel: set when the pixel is opaque enough to collide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl CollisionMask {
    /// Pixels with `alpha >= threshold` are solid
    pub fn from_image(img: &Image, threshold: u8) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            bits: img.pixels().iter().map(|p| p.a >= threshold).collect(),
        }
    }

    /// Fully solid mask
    pub fn solid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    /// Number of solid pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True when `other`, placed at `(dx, dy)` relative to this mask's
    /// origin, shares at least one solid pixel with it.
    pub fn overlaps(&self, other: &CollisionMask, dx: i32, dy: i32) -> bool {
        if self.width == 0 || self.height == 0 || other.width == 0 || other.height == 0 {
            return false;
        }

        // Intersection in this mask's coordinates (i64 avoids overflow on huge offsets)
        let (dx, dy) = (dx as i64, dy as i64);
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (self.width as i64).min(dx + other.width as i64);
        let y1 = (self.height as i64).min(dy + other.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        for y in y0..y1 {
            let row = (y * self.width as i64) as usize;
            let other_row = ((y - dy) * other.width as i64) as usize;
            for x in x0..x1 {
                if self.bits[row + x as usize] && other.bits[other_row + (x - dx) as usize] {
                    return true;
                }
            }
        }
        false
    }
}
