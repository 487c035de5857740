use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseButton};

/// Transitions observed since the last presented frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events:           Vec<InputEvent>,
    pub keys_pressed:     HashSet<Key>,
    pub keys_released:    HashSet<Key>,
    pub buttons_pressed:  HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,
    /// Sum of wheel deltas, line deltas scaled to pixels.
    pub wheel:            (f32, f32),
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.wheel = (0.0, 0.0);
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }
}
