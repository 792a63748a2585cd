use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseButton, MouseButtonState, PointerButtonEvent};

/// Per-frame input deltas.
///
/// `InputState` holds what is currently down; `InputFrame` holds what changed
/// since the last frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// Keys pressed this frame. Repeats are not included.
    pub keys_pressed: HashSet<Key>,

    pub keys_released: HashSet<Key>,

    pub buttons_pressed: HashSet<MouseButton>,

    pub buttons_released: HashSet<MouseButton>,

    /// Accumulated vertical wheel movement, in lines.
    pub wheel_lines: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.wheel_lines = 0.0;
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// First press of `button` this frame, with the position it happened at.
    pub fn first_press(&self, button: MouseButton) -> Option<PointerButtonEvent> {
        self.events.iter().find_map(|ev| match ev {
            InputEvent::PointerButton(b)
                if b.button == button && b.state == MouseButtonState::Pressed =>
            {
                Some(*b)
            }
            _ => None,
        })
    }
}
