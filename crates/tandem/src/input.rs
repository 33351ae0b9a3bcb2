//! Keyboard input as seen by the simulation.
//!
//! The game asks an [`InputSource`] it owns instead of a process-wide window.

use std::collections::HashSet;

/// Keys the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Forward.
    W,
    /// Strafe along +right.
    A,
    /// Back.
    S,
    /// Strafe along -right.
    D,
    /// Up.
    R,
    /// Down.
    F,
}

/// Anything that can report key state.
pub trait InputSource {
    /// Whether `key` is held this tick.
    fn is_key_pressed(&self, key: Key) -> bool;
}

/// No keys, ever. Used headless.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_key_pressed(&self, _key: Key) -> bool {
        false
    }
}

/// Key state set by hand, for tests and scripted runs.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    held: HashSet<Key>,
}

impl ScriptedInput {
    /// Creates an input with nothing held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Holds `key` until released.
    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    /// Releases `key`.
    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Releases everything.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl InputSource for ScriptedInput {
    fn is_key_pressed(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}
