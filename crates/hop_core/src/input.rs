//! Keyboard state for the gameplay keys.
//!
//! `is_held` is level-triggered: true every frame the key is down.
//! `is_just_pressed` / `is_just_released` are edge-triggered and survive until
//! `end_frame()`. The runner calls that only after a frame consumed at least
//! one fixed step, so a press on a zero-step frame is not lost.
//!
//! The simulation never queries `InputState` directly. Each fixed step takes an
//! [`InputSnapshot`] value, which keeps the tick a pure function of
//! (state, input, dt).

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Space,
    /// Held to walk through geometry.
    E,
}

/// Frozen per-step view of the controls plus the clock.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Seconds since the previous step.
    pub dt: f32,
    /// Monotonic timestamp of this step, in seconds.
    pub now: f64,
    pub left: bool,
    pub right: bool,
    /// Jump went down on this step.
    pub jump_pressed: bool,
    pub jump_held: bool,
    /// Collision resolution is skipped while held.
    pub noclip: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Capture the gameplay controls for one fixed step.
    pub fn snapshot(&self, now: f64, dt: f32) -> InputSnapshot {
        InputSnapshot {
            dt,
            now,
            left: self.is_held(Key::Left),
            right: self.is_held(Key::Right),
            jump_pressed: self.is_just_pressed(Key::Space),
            jump_held: self.is_held(Key::Space),
            noclip: self.is_held(Key::E),
        }
    }

    /// Drop edge state once a simulation step has seen it.
    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
