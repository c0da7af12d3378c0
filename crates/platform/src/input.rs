//! Keyboard input tracking.

use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

/// Tracks which keys are currently held down.
///
/// The event queue carries edge-triggered events (press/release); this state
/// answers the level-triggered question "is W held right now" that camera
/// movement polls every tick.
#[derive(Debug, Default)]
pub struct InputState {
    held_keys: HashSet<KeyCode>,
}

impl InputState {
    /// Create a new input state with no keys held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press event.
    pub fn on_key_pressed(&mut self, key: KeyCode) {
        self.held_keys.insert(key);
    }

    /// Handle a key release event.
    pub fn on_key_released(&mut self, key: KeyCode) {
        self.held_keys.remove(&key);
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    /// Release all keys, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held_keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press_release() {
        let mut input = InputState::new();
        assert!(!input.is_key_held(KeyCode::KeyW));

        input.on_key_pressed(KeyCode::KeyW);
        assert!(input.is_key_held(KeyCode::KeyW));

        input.on_key_released(KeyCode::KeyW);
        assert!(!input.is_key_held(KeyCode::KeyW));
    }

    #[test]
    fn test_repeated_press_is_idempotent() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyA);
        input.on_key_pressed(KeyCode::KeyA);
        assert!(input.is_key_held(KeyCode::KeyA));

        input.on_key_released(KeyCode::KeyA);
        assert!(!input.is_key_held(KeyCode::KeyA));
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut input = InputState::new();
        input.on_key_pressed(KeyCode::KeyW);
        input.on_key_pressed(KeyCode::ArrowUp);

        input.clear();
        assert!(!input.is_key_held(KeyCode::KeyW));
        assert!(!input.is_key_held(KeyCode::ArrowUp));
    }
}
