//! Screen state machine
//!
//! Menu → (Cinematic) → Playing → GameOver → Menu, with Help reachable from
//! Menu and Playing. Each transition runs the exit action of the screen being
//! left and the entry action of the next one; music and record bookkeeping
//! happen only there.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::assets::AssetRegistry;
use crate::audio::{AudioOutput, Playlist};
use crate::error::Result;
use crate::platform::{Key, KeyEvent, KeyState};
use crate::record::RecordManager;
use crate::renderer::shapes::fill_circle;
use crate::renderer::{Rgba, Surface, colors, draw_backdrop, draw_session};
use crate::settings::GameConfig;
use crate::sim::{GameEvent, GameState, PowerUpKind, TickInput, tick};

/// Current screen
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Menu,
    Cinematic { elapsed: f32 },
    Playing,
    GameOver { final_score: u32, new_record: bool },
    /// Frozen overlay; `previous` is resumed untouched
    Help { previous: Box<Screen> },
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::Cinematic { .. } => "cinematic",
            Screen::Playing => "playing",
            Screen::GameOver { .. } => "game_over",
            Screen::Help { .. } => "help",
        }
    }
}

/// The whole game: screens, session, music and record
pub struct Game {
    config: GameConfig,
    screen: Screen,
    session: GameState,
    playlist: Playlist,
    records: RecordManager,
    /// Music choices only; the session has its own stream
    rng: Pcg32,
    autopilot: bool,
    running: bool,
}

impl Game {
    /// Build the session and collaborators, then enter the menu.
    ///
    /// Fails only when required sprites are missing.
    pub fn new(
        config: &GameConfig,
        assets: &dyn AssetRegistry,
        output: Box<dyn AudioOutput>,
        seed: u64,
    ) -> Result<Self> {
        assets.ensure_required()?;
        let session = GameState::new(config, assets, seed)?;
        let mut rng = Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
        let mut playlist = Playlist::new(output, &config.playlist);
        playlist.load_dir(&config.playlist, &mut rng);
        let records = RecordManager::load(&config.record_file);

        let mut game = Self {
            config: config.clone(),
            screen: Screen::Menu,
            session,
            playlist,
            records,
            rng,
            autopilot: false,
            running: true,
        };
        game.enter_menu();
        Ok(game)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn session(&self) -> &GameState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameState {
        &mut self.session
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn records(&self) -> &RecordManager {
        &self.records
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_autopilot(&mut self, on: bool) {
        self.autopilot = on;
    }

    fn cinematic_available(&self) -> bool {
        self.config
            .cinematic
            .video
            .as_deref()
            .is_some_and(|path| path.is_file())
    }

    fn transition(&mut self, next: Screen) {
        log::info!("Screen {} -> {}", self.screen.name(), next.name());
        self.screen = next;
    }

    fn enter_menu(&mut self) {
        self.transition(Screen::Menu);
        match self.config.playlist.menu_theme.clone() {
            Some(theme) => self.playlist.play_theme(&theme),
            None => self.playlist.stop(),
        }
    }

    fn enter_cinematic(&mut self) {
        self.playlist.stop();
        self.transition(Screen::Cinematic { elapsed: 0.0 });
    }

    fn enter_playing(&mut self) {
        self.playlist.stop();
        self.session.reset();
        self.transition(Screen::Playing);
    }

    fn enter_game_over(&mut self, final_score: u32) {
        self.playlist.fade_out();
        let new_record = self.records.check_new_record(final_score);
        if !new_record {
            log::info!(
                "Final score {final_score}, record {}",
                self.records.obtain_record()
            );
        }
        self.transition(Screen::GameOver {
            final_score,
            new_record,
        });
    }

    fn enter_help(&mut self) {
        let previous = Box::new(self.screen.clone());
        self.transition(Screen::Help { previous });
    }

    fn leave_help(&mut self) {
        if let Screen::Help { previous } = &self.screen {
            let previous = (**previous).clone();
            self.transition(previous);
        }
    }

    /// React to one discrete input event
    pub fn handle_event(&mut self, event: KeyEvent) {
        let key = match event {
            KeyEvent::Quit | KeyEvent::Pressed(Key::Escape) => {
                self.running = false;
                return;
            }
            KeyEvent::Pressed(key) => key,
        };

        match &self.screen {
            Screen::Menu => match key {
                Key::Space if self.cinematic_available() => self.enter_cinematic(),
                Key::Space => self.enter_playing(),
                Key::H => self.enter_help(),
                _ => {}
            },
            Screen::Cinematic { .. } => {
                if key == Key::Space {
                    self.enter_playing();
                }
            }
            Screen::Playing => self.handle_playing_key(key),
            Screen::Help { .. } => {
                if key == Key::H {
                    self.leave_help();
                }
            }
            Screen::GameOver { .. } => {
                if key == Key::R {
                    self.enter_menu();
                }
            }
        }
    }

    fn handle_playing_key(&mut self, key: Key) {
        match key {
            Key::P => self.playlist.toggle_pause(),
            Key::N => self.playlist.play_next(),
            Key::R => self.playlist.play_random(&mut self.rng),
            Key::M => self.playlist.toggle_mute(),
            Key::Plus => self.playlist.volume_up(),
            Key::Minus => self.playlist.volume_down(),
            Key::Zero => self.playlist.reset_volume(),
            Key::F1 => self.records.reset(),
            Key::H => self.enter_help(),
            _ => {}
        }
    }

    /// Advance the current screen by `dt` seconds
    pub fn update(&mut self, keys: &KeyState, dt: f32) {
        match &mut self.screen {
            Screen::Cinematic { elapsed } => {
                *elapsed += dt;
                if *elapsed >= self.config.cinematic.duration {
                    self.enter_playing();
                }
            }
            Screen::Playing => self.update_playing(keys, dt),
            Screen::Menu | Screen::GameOver { .. } | Screen::Help { .. } => {}
        }
        self.playlist.update(dt);
    }

    fn update_playing(&mut self, keys: &KeyState, dt: f32) {
        self.playlist.ensure_playing(&mut self.rng);

        let mut input = TickInput::from_keys(keys.is_down(Key::Left), keys.is_down(Key::Right));
        input.autopilot = self.autopilot;
        tick(&mut self.session, &input, dt);

        for event in self.session.drain_events() {
            match event {
                GameEvent::LevelUp { level } if self.config.playlist.aggressive_volume => {
                    let volume = self
                        .playlist
                        .level_volume(level, self.config.playlist.volume_per_level);
                    self.playlist.set_volume(volume);
                }
                GameEvent::Collision { score } => {
                    self.enter_game_over(score);
                    return;
                }
                _ => {}
            }
        }
    }

    /// Render the current screen
    pub fn draw(&self, surface: &mut Surface) {
        match &self.screen {
            Screen::Menu => draw_backdrop(surface, colors::MENU_BACKGROUND, None),
            Screen::Cinematic { elapsed } => {
                let duration = self.config.cinematic.duration.max(f32::EPSILON);
                draw_backdrop(surface, colors::CINEMATIC_BACKGROUND, Some(elapsed / duration));
            }
            Screen::Playing => draw_session(surface, &self.session),
            Screen::Help { .. } => draw_help(surface),
            Screen::GameOver { new_record, .. } => {
                draw_backdrop(surface, colors::GAME_OVER_BACKGROUND, None);
                if *new_record {
                    let w = surface.width() as i32;
                    surface.fill_rect(w / 4, 40, w / 2, 12, Rgba::opaque(255, 215, 0));
                }
            }
        }
    }
}

/// One swatch per power-up kind
fn draw_help(surface: &mut Surface) {
    draw_backdrop(surface, colors::HELP_BACKGROUND, None);
    let y = surface.height() as f32 / 2.0;
    for (i, kind) in PowerUpKind::ALL.iter().enumerate() {
        let x = 200.0 + i as f32 * 200.0;
        fill_circle(surface.image_mut(), glam::Vec2::new(x, y), 30.0, kind.color());
    }
}
