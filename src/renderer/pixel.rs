//! Pixel type and image buffers for software rendering

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::error::{GameError, Result};

/// Straight (non-premultiplied) RGBA8 pixel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Channels as floats in [0, 1]
    #[inline]
    pub fn to_unit_rgb(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Source-over blend of `self` onto `dst`
    #[inline]
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            0 => dst,
            255 => self,
            a => {
                let a = a as u16;
                let blend = |s: u8, d: u8| -> u8 {
                    let v = s as u16 * a + d as u16 * (255 - a);
                    ((v + 1 + (v >> 8)) >> 8) as u8
                };
                let out_a = a + (dst.a as u16 * (255 - a)) / 255;
                Rgba::new(
                    blend(self.r, dst.r),
                    blend(self.g, dst.g),
                    blend(self.b, dst.b),
                    out_a.min(255) as u8,
                )
            }
        }
    }

    #[inline]
    pub fn with_alpha(self, a: u8) -> Rgba {
        Rgba { a, ..self }
    }
}

/// Colors for game elements
pub mod colors {
    use super::Rgba;

    pub const GRASS: Rgba = Rgba::opaque(50, 150, 50);
    pub const ASPHALT: Rgba = Rgba::opaque(70, 70, 75);
    pub const CURB: Rgba = Rgba::opaque(200, 40, 40);
    pub const LANE_MARK: Rgba = Rgba::opaque(235, 235, 235);
    pub const MENU_BACKGROUND: Rgba = Rgba::opaque(15, 15, 30);
    pub const GAME_OVER_BACKGROUND: Rgba = Rgba::opaque(40, 0, 0);
    pub const HELP_BACKGROUND: Rgba = Rgba::opaque(10, 30, 60);
    pub const CINEMATIC_BACKGROUND: Rgba = Rgba::opaque(0, 0, 0);
    pub const SIREN: Rgba = Rgba::new(255, 0, 0, 30);
    /// Police roof beacon, one color per siren frame
    pub const BEACON: [Rgba; 2] = [Rgba::new(255, 30, 30, 170), Rgba::new(30, 80, 255, 170)];
    pub const LANE_ARROW: Rgba = Rgba::new(255, 255, 0, 180);
    pub const WINDSHIELD: Rgba = Rgba::opaque(120, 170, 210);
}

/// Owned RGBA image backed by an `image::RgbaImage`
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    buf: RgbaImage,
}

impl Image {
    /// Create an image filled with one color
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            buf: RgbaImage::from_pixel(width, height, color.into()),
        }
    }

    /// Fully transparent image
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Wrap a decoded buffer
    pub fn from_rgba(buf: RgbaImage) -> Self {
        Self { buf }
    }

    /// Decode an image file into straight RGBA8
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|source| GameError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_rgba(decoded.to_rgba8()))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.buf.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.buf.height()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        bytemuck::cast_slice(&*self.buf)
    }

    #[inline]
    fn pixels_mut(&mut self) -> &mut [Rgba] {
        bytemuck::cast_slice_mut(&mut *self.buf)
    }

    /// Raw RGBA8 bytes, ready for presentation
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_raw()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        (*self.buf.get_pixel(x, y)).into()
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) {
        self.buf.put_pixel(x, y, color.into());
    }

    /// Blend a color at signed coordinates, ignoring out-of-range writes
    #[inline]
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let idx = y as usize * self.width() as usize + x as usize;
        let pixels = self.pixels_mut();
        pixels[idx] = color.over(pixels[idx]);
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels_mut().fill(color);
    }

    /// Linear (triangle filter) resample
    pub fn resize_bilinear(&self, width: u32, height: u32) -> Image {
        if self.is_empty() || width == 0 || height == 0 {
            return Image::transparent(width, height);
        }
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        Self::from_rgba(imageops::resize(
            &self.buf,
            width,
            height,
            FilterType::Triangle,
        ))
    }
}

impl From<Rgba> for image::Rgba<u8> {
    fn from(c: Rgba) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

impl From<image::Rgba<u8>> for Rgba {
    fn from(p: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = p.0;
        Rgba::new(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_over_extremes() {
        let dst = Rgba::opaque(10, 20, 30);
        assert_eq!(Rgba::TRANSPARENT.over(dst), dst);
        let src = Rgba::opaque(200, 100, 50);
        assert_eq!(src.over(dst), src);
    }

    #[test]
    fn test_over_half_alpha() {
        let src = Rgba::new(255, 255, 255, 128);
        let dst = Rgba::opaque(0, 0, 0);
        let out = src.over(dst);
        assert!((out.r as i32 - 128).abs() <= 1);
        assert_eq!(out.a, 255);
    }

    #[test]
    fn test_from_rgba_keeps_channel_order() {
        let buf = RgbaImage::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let img = Image::from_rgba(buf);
        assert_eq!(img.get(1, 0), Rgba::new(5, 6, 7, 8));
        assert_eq!(img.pixels()[0], Rgba::new(1, 2, 3, 4));
        assert_eq!(img.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_open_round_trips_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprite.png");
        let mut buf = RgbaImage::new(3, 2);
        buf.put_pixel(2, 1, image::Rgba([10, 20, 30, 128]));
        buf.save(&path).unwrap();

        let img = Image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.get(2, 1), Rgba::new(10, 20, 30, 128));
        assert_eq!(img.get(0, 0), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(Image::open(&path), Err(GameError::Image { .. })));
    }

    #[test]
    fn test_fill_and_blend_write_through() {
        let mut img = Image::transparent(3, 3);
        img.fill(Rgba::opaque(1, 1, 1));
        img.blend(1, 2, Rgba::opaque(9, 8, 7));
        assert_eq!(img.get(1, 2), Rgba::opaque(9, 8, 7));
        assert_eq!(img.get(2, 2), Rgba::opaque(1, 1, 1));
    }

    #[test]
    fn test_resize_uniform_color_is_stable() {
        let img = Image::filled(40, 20, Rgba::opaque(70, 80, 90));
        let small = img.resize_bilinear(13, 7);
        assert_eq!(small.width(), 13);
        assert!(small.pixels().iter().all(|p| *p == Rgba::opaque(70, 80, 90)));
        let big = img.resize_bilinear(80, 40);
        assert_eq!(big.height(), 40);
        assert!(big.pixels().iter().all(|p| *p == Rgba::opaque(70, 80, 90)));
    }

    #[test]
    fn test_blend_out_of_bounds_is_ignored() {
        let mut img = Image::filled(2, 2, Rgba::opaque(0, 0, 0));
        img.blend(-1, 0, Rgba::opaque(255, 0, 0));
        img.blend(5, 5, Rgba::opaque(255, 0, 0));
        assert!(img.pixels().iter().all(|p| *p == Rgba::opaque(0, 0, 0)));
    }
}
