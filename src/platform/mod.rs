//! Platform abstraction layer
//!
//! Handles the parts of the host the game reads every frame:
//! - Held-key snapshot and discrete key presses
//! - Monotonic frame clock with clamped deltas

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::clamp_dt;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Space,
    Escape,
    H,
    P,
    N,
    R,
    M,
    Plus,
    Minus,
    Zero,
    F1,
}

impl Key {
    /// Map a key name as typed in scripts or by a host window layer
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "a" => Some(Key::Left),
            "right" | "d" => Some(Key::Right),
            "space" | " " => Some(Key::Space),
            "escape" | "esc" => Some(Key::Escape),
            "h" => Some(Key::H),
            "p" => Some(Key::P),
            "n" => Some(Key::N),
            "r" => Some(Key::R),
            "m" => Some(Key::M),
            "+" | "=" | "plus" => Some(Key::Plus),
            "-" | "minus" => Some(Key::Minus),
            "0" => Some(Key::Zero),
            "f1" => Some(Key::F1),
            _ => None,
        }
    }
}

/// Discrete input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(Key),
    /// Window closed
    Quit,
}

/// Keys currently held down
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<Key>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn set(&mut self, key: Key, down: bool) {
        if down {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

/// Frame timing against a monotonic clock
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    target: Duration,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            last: Instant::now(),
            target: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
        }
    }

    /// Seconds since the previous call, clamped to the simulation maximum
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        clamp_dt(dt)
    }

    /// Time left in the current frame budget
    pub fn remaining(&self) -> Duration {
        self.target.saturating_sub(self.last.elapsed())
    }

    /// Sleep out the rest of the frame budget
    pub fn wait(&self) {
        let left = self.remaining();
        if !left.is_zero() {
            std::thread::sleep(left);
        }
    }

    pub fn target(&self) -> Duration {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_DT;

    #[test]
    fn test_key_state() {
        let mut keys = KeyState::new();
        keys.press(Key::Left);
        assert!(keys.is_down(Key::Left));
        keys.set(Key::Left, false);
        assert!(!keys.is_down(Key::Left));
        keys.press(Key::Right);
        keys.clear();
        assert!(!keys.is_down(Key::Right));
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_str("Space"), Some(Key::Space));
        assert_eq!(Key::from_str("="), Some(Key::Plus));
        assert_eq!(Key::from_str("F1"), Some(Key::F1));
        assert_eq!(Key::from_str("q"), None);
    }

    #[test]
    fn test_clock_clamps() {
        let mut clock = FrameClock::new(60);
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(clock.tick(), MAX_DT);
        let dt = clock.tick();
        assert!((0.0..MAX_DT).contains(&dt));
        assert!(clock.remaining() <= clock.target());
    }
}
