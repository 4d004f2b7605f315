//! Crate-wide error type

use core::fmt;
use std::io;
use std::path::PathBuf;

use crate::assets::SpriteKind;

#[derive(Debug)]
pub enum GameError {
    /// A sprite the game cannot run without is absent from the registry
    MissingAsset { kind: SpriteKind },
    /// A sprite with zero width or height
    InvalidSprite { width: u32, height: u32, len: usize },
    /// A configuration value outside its accepted range
    InvalidConfig { field: &'static str, reason: String },
    /// Config file could not be parsed
    ConfigParse { path: PathBuf, source: serde_json::Error },
    /// Sprite file exists but could not be decoded
    Image { path: PathBuf, source: image::ImageError },
    /// Filesystem failure with the path involved
    Io { path: PathBuf, source: io::Error },
    /// Audio device rejected an operation
    Audio { op: &'static str, reason: String },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAsset { kind } => write!(f, "required sprite missing: {kind}"),
            Self::InvalidSprite { width, height, len } => write!(
                f,
                "invalid sprite buffer: {width}x{height} with {len} pixels"
            ),
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config value `{field}`: {reason}")
            }
            Self::ConfigParse { path, source } => {
                write!(f, "failed to parse config {}: {source}", path.display())
            }
            Self::Image { path, source } => {
                write!(f, "failed to decode sprite {}: {source}", path.display())
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Audio { op, reason } => write!(f, "audio {op} failed: {reason}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigParse { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

impl GameError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
