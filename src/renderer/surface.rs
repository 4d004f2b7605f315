//! Frame surface the game draws into each frame

use super::pixel::{Image, Rgba};
use super::shapes::fill_rect;

/// Fixed-size RGBA frame with alpha-blended blits
#[derive(Debug, Clone)]
pub struct Surface {
    frame: Image,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: Image::filled(width, height, Rgba::opaque(0, 0, 0)),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    pub fn clear(&mut self, color: Rgba) {
        self.frame.fill(color);
    }

    /// Source-over blit with the sprite's top-left at `(x, y)`, clipped
    pub fn blit(&mut self, sprite: &Image, x: i32, y: i32) {
        self.blit_with(sprite, x, y, |p| p);
    }

    /// Blit, then blend `tint` over the sprite's non-transparent pixels
    pub fn blit_tinted(&mut self, sprite: &Image, x: i32, y: i32, tint: Rgba) {
        self.blit_with(sprite, x, y, |p| if p.a == 0 { p } else { tint.over(p) });
    }

    fn blit_with(&mut self, sprite: &Image, x: i32, y: i32, shade: impl Fn(Rgba) -> Rgba) {
        let fw = self.frame.width() as i32;
        let fh = self.frame.height() as i32;
        let sx0 = (-x).max(0);
        let sy0 = (-y).max(0);
        let sx1 = (sprite.width() as i32).min(fw - x);
        let sy1 = (sprite.height() as i32).min(fh - y);
        for sy in sy0..sy1 {
            for sx in sx0..sx1 {
                let src = shade(sprite.get(sx as u32, sy as u32));
                if src.a > 0 {
                    self.frame.blend(x + sx, y + sy, src);
                }
            }
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgba) {
        fill_rect(&mut self.frame, x, y, w, h, color);
    }

    pub fn image(&self) -> &Image {
        &self.frame
    }

    pub fn image_mut(&mut self) -> &mut Image {
        &mut self.frame
    }

    /// Raw RGBA8 bytes, ready for upload or encoding
    pub fn as_bytes(&self) -> &[u8] {
        self.frame.as_bytes()
    }
}
