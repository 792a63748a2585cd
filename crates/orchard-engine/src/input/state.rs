use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{
    InputEvent,
    Key,
    KeyState,
    MouseButton,
    MouseButtonState,
    Modifiers,
    PointerButtonEvent,
    PointerMoveEvent,
};

/// Current input state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    pub focused: bool,

    /// Pointer position in logical pixels.
    pub pointer_pos: Option<(f32, f32)>,

    pub keys_down: HashSet<Key>,

    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies an event to the current state and records deltas in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases never arrive for keys held across a focus change.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
            }

            InputEvent::Key {
                key,
                state,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;

                match state {
                    KeyState::Pressed => {
                        if self.keys_down.insert(*key) {
                            frame.keys_pressed.insert(*key);
                        }
                    }
                    KeyState::Released => {
                        if self.keys_down.remove(key) {
                            frame.keys_released.insert(*key);
                        }
                    }
                }
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                x,
                y,
                modifiers,
            }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;

                match state {
                    MouseButtonState::Pressed => {
                        if self.buttons_down.insert(*button) {
                            frame.buttons_pressed.insert(*button);
                        }
                    }
                    MouseButtonState::Released => {
                        if self.buttons_down.remove(button) {
                            frame.buttons_released.insert(*button);
                        }
                    }
                }
            }

            InputEvent::MouseWheel { delta, modifiers } => {
                self.modifiers = *modifiers;
                frame.wheel_lines += delta.lines_y();
            }
        }

        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn key(k: Key, state: KeyState) -> InputEvent {
        InputEvent::Key { key: k, state, modifiers: Modifiers::default(), repeat: false }
    }

    #[test]
    fn press_and_release_are_recorded_once() {
        let mut s = InputState::default();
        let mut f = InputFrame::default();
        s.apply_event(&mut f, key(Key::W, KeyState::Pressed));
        s.apply_event(&mut f, key(Key::W, KeyState::Pressed));
        assert!(s.key_down(Key::W));
        assert!(f.key_pressed(Key::W));
        assert_eq!(f.events.len(), 2);

        f.clear();
        s.apply_event(&mut f, key(Key::W, KeyState::Released));
        assert!(!s.key_down(Key::W));
        assert!(f.keys_released.contains(&Key::W));
        assert!(!f.key_pressed(Key::W));
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut s = InputState::default();
        let mut f = InputFrame::default();
        s.apply_event(&mut f, key(Key::A, KeyState::Pressed));
        s.apply_event(&mut f, InputEvent::Focused(false));
        assert!(!s.key_down(Key::A));
    }

    #[test]
    fn first_press_reports_click_position() {
        let mut s = InputState::default();
        let mut f = InputFrame::default();
        s.apply_event(&mut f, InputEvent::PointerMoved(PointerMoveEvent { x: 10.0, y: 20.0 }));
        s.apply_event(
            &mut f,
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 12.0,
                y: 22.0,
                modifiers: Modifiers::default(),
            }),
        );
        let press = f.first_press(MouseButton::Left).unwrap();
        assert_eq!((press.x, press.y), (12.0, 22.0));
        assert!(f.first_press(MouseButton::Right).is_none());
    }

    #[test]
    fn wheel_accumulates_lines() {
        let mut s = InputState::default();
        let mut f = InputFrame::default();
        let m = Modifiers::default();
        s.apply_event(&mut f, InputEvent::MouseWheel { delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 }, modifiers: m });
        s.apply_event(&mut f, InputEvent::MouseWheel { delta: MouseWheelDelta::Pixel { x: 0.0, y: 40.0 }, modifiers: m });
        assert!((f.wheel_lines - 3.0).abs() < 1e-6);
    }
}
