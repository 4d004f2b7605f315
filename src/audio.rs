//! Music output and playlist management
//!
//! The audio device is reached only through the [`AudioOutput`] capability,
//! which the [`Playlist`] owns. Only one track plays at a time: starting a
//! track always stops the previous one first.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::{GameError, Result};
use crate::settings::PlaylistConfig;

/// Loop count meaning "until stopped"
pub const LOOP_FOREVER: i32 = -1;

/// Primitive music operations of an audio device
pub trait AudioOutput {
    fn load(&mut self, path: &Path) -> Result<()>;
    /// Play the loaded track `loops` extra times (`LOOP_FOREVER` repeats)
    fn play(&mut self, loops: i32) -> Result<()>;
    fn stop(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Volume in [0, 1]
    fn set_volume(&mut self, volume: f32);
    fn is_playing(&self) -> bool;
    /// Advance device time; devices that stream on their own ignore this
    fn tick(&mut self, _dt: f32) {}
}

/// Device that produces no sound but keeps the playback state
#[derive(Debug, Clone, Default)]
pub struct SilentOutput {
    loaded: Option<PathBuf>,
    playing: bool,
    paused: bool,
    volume: f32,
    /// Simulated length of every track; `None` plays forever
    track_length: Option<f32>,
    position: f32,
    loops_left: i32,
}

impl SilentOutput {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Default::default()
        }
    }

    /// Tracks end after `seconds`, so playlists advance in headless runs
    pub fn with_track_length(seconds: f32) -> Self {
        Self {
            track_length: Some(seconds),
            ..Self::new()
        }
    }

    pub fn loaded(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl AudioOutput for SilentOutput {
    fn load(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(GameError::Audio {
                op: "load",
                reason: format!("{} not found", path.display()),
            });
        }
        self.stop();
        self.loaded = Some(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self, loops: i32) -> Result<()> {
        if self.loaded.is_none() {
            return Err(GameError::Audio {
                op: "play",
                reason: "no track loaded".into(),
            });
        }
        self.playing = true;
        self.paused = false;
        self.position = 0.0;
        self.loops_left = loops;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
        self.paused = false;
        self.position = 0.0;
    }

    fn pause(&mut self) {
        if self.playing {
            self.paused = true;
        }
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_playing(&self) -> bool {
        self.playing && !self.paused
    }

    fn tick(&mut self, dt: f32) {
        let Some(length) = self.track_length else {
            return;
        };
        if !self.is_playing() {
            return;
        }
        self.position += dt;
        if self.position >= length {
            self.position = 0.0;
            if self.loops_left == 0 {
                self.playing = false;
            } else if self.loops_left > 0 {
                self.loops_left -= 1;
            }
        }
    }
}

/// Shuffled music playlist driving one [`AudioOutput`]
pub struct Playlist {
    output: Box<dyn AudioOutput>,
    tracks: Vec<PathBuf>,
    next_index: usize,
    current: Option<PathBuf>,
    volume: f32,
    default_volume: f32,
    volume_step: f32,
    fade_time: f32,
    /// Seconds into the current fade-out
    fade: Option<f32>,
    paused: bool,
    muted: bool,
}

impl Playlist {
    pub fn new(output: Box<dyn AudioOutput>, config: &PlaylistConfig) -> Self {
        Self {
            output,
            tracks: Vec::new(),
            next_index: 0,
            current: None,
            volume: config.volume.clamp(0.0, 1.0),
            default_volume: config.volume.clamp(0.0, 1.0),
            volume_step: config.volume_step,
            fade_time: config.fade_time,
            fade: None,
            paused: false,
            muted: false,
        }
    }

    /// Collect music files from the configured directory and shuffle them once.
    ///
    /// A missing or unreadable directory leaves the playlist empty.
    pub fn load_dir<R: Rng + ?Sized>(&mut self, config: &PlaylistConfig, rng: &mut R) -> usize {
        let entries = match fs::read_dir(&config.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Playlist folder {} unavailable: {e}", config.dir.display());
                return 0;
            }
        };
        let mut tracks: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| has_extension(path, &config.extensions))
            .collect();
        // Directory order is platform dependent; sort so a seed reproduces the shuffle
        tracks.sort();
        self.set_tracks(tracks, rng);
        if self.tracks.is_empty() {
            log::warn!("No music found in {}", config.dir.display());
        } else {
            log::info!("Playlist loaded with {} tracks", self.tracks.len());
        }
        self.tracks.len()
    }

    /// Replace the track list, shuffled
    pub fn set_tracks<R: Rng + ?Sized>(&mut self, mut tracks: Vec<PathBuf>, rng: &mut R) {
        tracks.shuffle(rng);
        self.tracks = tracks;
        self.next_index = 0;
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.output.is_playing()
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    /// Stop whatever plays, then start `path` `loops` extra times
    fn start(&mut self, path: &Path, loops: i32) -> Result<()> {
        if self.output.is_playing() {
            self.output.stop();
        }
        self.fade = None;
        self.paused = false;
        self.output.load(path)?;
        self.output.set_volume(self.effective_volume());
        self.output.play(loops)
    }

    fn start_track(&mut self, path: PathBuf) {
        match self.start(&path, 0) {
            Ok(()) => {
                log::info!("Playing {}", path.display());
                self.current = Some(path);
            }
            Err(e) => {
                log::error!("Could not play {}: {e}", path.display());
                self.current = None;
            }
        }
    }

    /// Next track in shuffled order, wrapping at the end
    pub fn play_next(&mut self) {
        if self.tracks.is_empty() {
            log::warn!("Playlist is empty");
            return;
        }
        let path = self.tracks[self.next_index].clone();
        self.next_index = (self.next_index + 1) % self.tracks.len();
        self.start_track(path);
    }

    /// Uniformly random track
    pub fn play_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(path) = self.tracks.choose(rng).cloned() else {
            log::warn!("Playlist is empty");
            return;
        };
        self.start_track(path);
    }

    /// Loop a theme outside the playlist (menu music); absent files are skipped
    pub fn play_theme(&mut self, path: &Path) {
        self.current = None;
        if let Err(e) = self.start(path, LOOP_FOREVER) {
            log::warn!("Theme {} unavailable: {e}", path.display());
        }
    }

    /// Keep game music going: start one if none, advance when a track ends
    pub fn ensure_playing<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.tracks.is_empty() || self.fade.is_some() {
            return;
        }
        if self.current.is_none() {
            self.play_random(rng);
        } else if !self.paused && !self.output.is_playing() {
            self.play_next();
        }
    }

    pub fn stop(&mut self) {
        self.output.stop();
        self.fade = None;
        self.paused = false;
    }

    /// Ramp the volume down over the fade time, then stop
    pub fn fade_out(&mut self) {
        log::debug!("Fading out playlist");
        self.fade = Some(0.0);
    }

    /// Advance the device and any running fade
    pub fn update(&mut self, dt: f32) {
        self.output.tick(dt);
        let Some(elapsed) = self.fade else {
            return;
        };
        let elapsed = elapsed + dt;
        if elapsed >= self.fade_time {
            self.output.stop();
            self.fade = None;
        } else {
            let progress = elapsed / self.fade_time;
            self.output
                .set_volume(self.effective_volume() * (1.0 - progress));
            self.fade = Some(elapsed);
        }
    }

    /// Clamp to [0, 1] and apply to the device
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.fade.is_none() {
            self.output.set_volume(self.effective_volume());
        }
    }

    /// Manual volume changes are ignored while muted
    pub fn volume_up(&mut self) {
        if !self.muted {
            self.set_volume(self.volume + self.volume_step);
        }
    }

    pub fn volume_down(&mut self) {
        if !self.muted {
            self.set_volume(self.volume - self.volume_step);
        }
    }

    pub fn reset_volume(&mut self) {
        if !self.muted {
            self.set_volume(self.default_volume);
        }
    }

    /// Volume for a difficulty level when it rises with the game
    pub fn level_volume(&self, level: u32, per_level: f32) -> f32 {
        (self.default_volume + level.saturating_sub(1) as f32 * per_level).min(1.0)
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.output.set_volume(self.effective_volume());
        log::info!("Music {}", if self.muted { "muted" } else { "unmuted" });
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.output.resume();
            self.paused = false;
        } else {
            self.output.pause();
            self.paused = true;
        }
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}
