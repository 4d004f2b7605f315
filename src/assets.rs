//! Sprite registry
//!
//! All sprites are registered once during start-up and handed out as shared
//! handles afterwards. Sprites come either from a directory of PNG files or
//! from the painted placeholder set.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::renderer::shapes::{fill_circle, fill_rect};
use crate::renderer::{Image, Rgba, colors};

/// Shared, immutable sprite pixels
pub type SpriteHandle = Rc<Image>;

/// Every sprite the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Player,
    Road,
    Taxi,
    Audi,
    Car,
    Police,
}

impl SpriteKind {
    /// Sprites the game cannot start without
    pub const REQUIRED: [SpriteKind; 6] = [
        SpriteKind::Player,
        SpriteKind::Road,
        SpriteKind::Taxi,
        SpriteKind::Audi,
        SpriteKind::Car,
        SpriteKind::Police,
    ];

    /// Obstacle car kinds, police last
    pub const OBSTACLES: [SpriteKind; 4] = [
        SpriteKind::Taxi,
        SpriteKind::Audi,
        SpriteKind::Car,
        SpriteKind::Police,
    ];

    /// Obstacle kinds eligible for the uniform (non-police) draw
    pub const CIVILIAN: [SpriteKind; 3] = [SpriteKind::Taxi, SpriteKind::Audi, SpriteKind::Car];

    /// Asset file name for this sprite
    pub fn file_name(&self) -> &'static str {
        match self {
            SpriteKind::Player => "carro_jogador.png",
            SpriteKind::Road => "road.png",
            SpriteKind::Taxi => "taxi.png",
            SpriteKind::Audi => "audi.png",
            SpriteKind::Car => "car.png",
            SpriteKind::Police => "police.png",
        }
    }
}

impl fmt::Display for SpriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Source of sprites, queried after the registry has been populated
pub trait AssetRegistry {
    fn load(&self, kind: SpriteKind) -> Result<SpriteHandle>;

    /// Fail fast when any required sprite is missing
    fn ensure_required(&self) -> Result<()> {
        for kind in SpriteKind::REQUIRED {
            self.load(kind)?;
        }
        Ok(())
    }
}

/// In-memory registry keyed by sprite kind
#[derive(Debug, Default, Clone)]
pub struct SpriteAtlas {
    sprites: HashMap<SpriteKind, SpriteHandle>,
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a sprite; empty images are rejected
    pub fn insert(&mut self, kind: SpriteKind, image: Image) -> Result<()> {
        if image.is_empty() {
            return Err(GameError::InvalidSprite {
                width: image.width(),
                height: image.height(),
                len: image.pixels().len(),
            });
        }
        log::debug!("Registered sprite {kind} ({}x{})", image.width(), image.height());
        self.sprites.insert(kind, Rc::new(image));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Decode every required sprite from `dir`, using the fixed file names
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut atlas = Self::new();
        for kind in SpriteKind::REQUIRED {
            let path = dir.join(kind.file_name());
            if !path.is_file() {
                log::error!("Sprite {kind} not found at {}", path.display());
                return Err(GameError::MissingAsset { kind });
            }
            atlas.insert(kind, Image::open(&path)?)?;
        }
        log::info!("Loaded {} sprites from {}", atlas.len(), dir.display());
        Ok(atlas)
    }

    /// Atlas of painted placeholder sprites covering every required kind
    pub fn procedural() -> Self {
        let mut atlas = Self::new();
        let entries = [
            (SpriteKind::Player, paint_car(Rgba::opaque(30, 90, 220), false)),
            (SpriteKind::Road, paint_road(512, 720)),
            (SpriteKind::Taxi, paint_car(Rgba::opaque(240, 200, 20), false)),
            (SpriteKind::Audi, paint_car(Rgba::opaque(160, 160, 170), false)),
            (SpriteKind::Car, paint_car(Rgba::opaque(200, 40, 40), false)),
            (SpriteKind::Police, paint_car(Rgba::opaque(20, 20, 25), true)),
        ];
        for (kind, image) in entries {
            atlas.sprites.insert(kind, Rc::new(image));
        }
        atlas
    }
}

impl AssetRegistry for SpriteAtlas {
    fn load(&self, kind: SpriteKind) -> Result<SpriteHandle> {
        self.sprites
            .get(&kind)
            .cloned()
            .ok_or(GameError::MissingAsset { kind })
    }
}

/// Top-down car: rounded body on a transparent background
fn paint_car(body: Rgba, light_bar: bool) -> Image {
    let (w, h) = (48u32, 96u32);
    let mut img = Image::transparent(w, h);
    let r = 10.0;

    fill_rect(&mut img, 0, r as i32, w as i32, (h as f32 - 2.0 * r) as i32, body);
    fill_rect(&mut img, r as i32, 0, (w as f32 - 2.0 * r) as i32, h as i32, body);
    for (cx, cy) in [(r, r), (w as f32 - r, r), (r, h as f32 - r), (w as f32 - r, h as f32 - r)] {
        fill_circle(&mut img, Vec2::new(cx, cy), r, body);
    }

    fill_rect(&mut img, 8, 22, (w - 16) as i32, 16, colors::WINDSHIELD);
    fill_rect(&mut img, 8, 66, (w - 16) as i32, 12, colors::WINDSHIELD);

    if light_bar {
        fill_rect(&mut img, 8, 44, 16, 8, Rgba::opaque(230, 20, 20));
        fill_rect(&mut img, 24, 44, 16, 8, Rgba::opaque(20, 60, 230));
        fill_rect(&mut img, 4, 54, (w - 8) as i32, 8, Rgba::opaque(240, 240, 240));
    }
    img
}

/// Road tile: grass verges, curbs, dark asphalt with dashed lane markings
fn paint_road(w: u32, h: u32) -> Image {
    let mut img = Image::filled(w, h, colors::GRASS);
    let asphalt_x = (w as f32 * 0.12) as i32;
    let asphalt_w = w as i32 - 2 * asphalt_x;

    fill_rect(&mut img, asphalt_x - 10, 0, 10, h as i32, colors::CURB);
    fill_rect(&mut img, asphalt_x + asphalt_w, 0, 10, h as i32, colors::CURB);
    fill_rect(&mut img, asphalt_x, 0, asphalt_w, h as i32, colors::ASPHALT);

    let lane_w = asphalt_w / 3;
    for i in 1..3 {
        let x = asphalt_x + i * lane_w - 2;
        let mut y = 0;
        while y < h as i32 {
            fill_rect(&mut img, x, y, 4, 40, colors::LANE_MARK);
            y += 80;
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DetectorConfig;
    use crate::sim::road::detect_asphalt_bounds;

    #[test]
    fn test_missing_sprite_is_error() {
        let atlas = SpriteAtlas::new();
        assert!(matches!(
            atlas.load(SpriteKind::Road),
            Err(GameError::MissingAsset {
                kind: SpriteKind::Road
            })
        ));
        assert!(atlas.ensure_required().is_err());
    }

    #[test]
    fn test_insert_and_load_share_pixels() {
        let mut atlas = SpriteAtlas::new();
        atlas
            .insert(SpriteKind::Taxi, Image::filled(4, 8, Rgba::opaque(1, 2, 3)))
            .unwrap();
        let a = atlas.load(SpriteKind::Taxi).unwrap();
        let b = atlas.load(SpriteKind::Taxi).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(atlas.insert(SpriteKind::Car, Image::transparent(0, 4)).is_err());
    }

    #[test]
    fn test_procedural_atlas_is_complete() {
        let atlas = SpriteAtlas::procedural();
        assert!(atlas.ensure_required().is_ok());
        assert_eq!(atlas.len(), SpriteKind::REQUIRED.len());
    }

    #[test]
    fn test_procedural_road_is_detectable() {
        let road = paint_road(512, 720);
        let bounds = detect_asphalt_bounds(&road, 0, &DetectorConfig::default());
        let expected_x = (512.0f32 * 0.12) as i32;
        assert!((bounds.inner_x - expected_x).abs() <= 3);
        assert!((bounds.inner_w - (512 - 2 * expected_x)).abs() <= 6);
    }

    fn write_sprite_dir(dir: &Path, skip: Option<SpriteKind>) {
        for kind in SpriteKind::REQUIRED {
            if Some(kind) == skip {
                continue;
            }
            let painted = match kind {
                SpriteKind::Road => paint_road(256, 128),
                SpriteKind::Police => paint_car(Rgba::opaque(20, 20, 25), true),
                _ => paint_car(Rgba::opaque(200, 40, 40), false),
            };
            let buf = image::RgbaImage::from_raw(
                painted.width(),
                painted.height(),
                painted.as_bytes().to_vec(),
            )
            .unwrap();
            buf.save(dir.join(kind.file_name())).unwrap();
        }
    }

    #[test]
    fn test_from_dir_loads_every_sprite() {
        let dir = tempfile::tempdir().unwrap();
        write_sprite_dir(dir.path(), None);

        let atlas = SpriteAtlas::from_dir(dir.path()).unwrap();
        assert!(atlas.ensure_required().is_ok());
        let road = atlas.load(SpriteKind::Road).unwrap();
        assert_eq!((road.width(), road.height()), (256, 128));
        assert_eq!(*road, paint_road(256, 128));
        let police = atlas.load(SpriteKind::Police).unwrap();
        assert_eq!(police.get(0, 0).a, 0);
    }

    #[test]
    fn test_from_dir_missing_file_names_the_sprite() {
        let dir = tempfile::tempdir().unwrap();
        write_sprite_dir(dir.path(), Some(SpriteKind::Police));

        assert!(matches!(
            SpriteAtlas::from_dir(dir.path()),
            Err(GameError::MissingAsset {
                kind: SpriteKind::Police
            })
        ));
    }

    #[test]
    fn test_from_dir_rejects_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        write_sprite_dir(dir.path(), None);
        std::fs::write(dir.path().join(SpriteKind::Taxi.file_name()), b"garbage").unwrap();

        assert!(matches!(
            SpriteAtlas::from_dir(dir.path()),
            Err(GameError::Image { .. })
        ));
    }

    #[test]
    fn test_car_corners_are_transparent() {
        let car = paint_car(Rgba::opaque(200, 0, 0), false);
        assert_eq!(car.get(0, 0).a, 0);
        assert_eq!(car.get(24, 48).a, 255);
    }
}
