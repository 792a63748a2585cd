//! Keyboard bindings.

use orchard_engine::input::{InputEvent, InputFrame, InputState, Key, KeyState, Modifiers};

use crate::camera::CameraInput;

/// Scene command triggered by a key press.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    CycleCamera,
    Regrow,
    ToggleGravity,
    ToggleAudio,
    ToggleLamp,
    Quit,
}

/// One entry of the key table.
#[derive(Debug, Copy, Clone)]
pub struct Binding {
    pub key: Key,
    /// Control must be held (and only then does the binding fire).
    pub ctrl: bool,
    pub action: Action,
    pub help: &'static str,
}

pub const BINDINGS: &[Binding] = &[
    Binding { key: Key::C, ctrl: false, action: Action::CycleCamera, help: "cycle camera" },
    Binding { key: Key::Digit0, ctrl: true, action: Action::CycleCamera, help: "cycle camera" },
    Binding { key: Key::R, ctrl: false, action: Action::Regrow, help: "regrow the tree" },
    Binding { key: Key::G, ctrl: false, action: Action::ToggleGravity, help: "full / half gravity" },
    Binding { key: Key::M, ctrl: false, action: Action::ToggleAudio, help: "audio on / off" },
    Binding { key: Key::L, ctrl: false, action: Action::ToggleLamp, help: "lamp on / off" },
    Binding { key: Key::Escape, ctrl: false, action: Action::Quit, help: "quit" },
];

fn lookup(key: Key, modifiers: Modifiers) -> Option<Action> {
    BINDINGS
        .iter()
        .find(|b| b.key == key && b.ctrl == modifiers.ctrl)
        .map(|b| b.action)
}

/// Actions for this frame's key presses, in arrival order. Repeats are ignored.
pub fn actions(events: &[InputEvent]) -> Vec<Action> {
    events
        .iter()
        .filter_map(|ev| match ev {
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                modifiers,
                repeat: false,
            } => lookup(*key, *modifiers),
            _ => None,
        })
        .collect()
}

/// Free-camera movement from held keys and this frame's wheel.
///
/// `W A S D` move, `Space` / `Shift` rise and sink, arrows look, the wheel
/// zooms. Nothing moves while Control is held so `Ctrl+0` does not nudge the
/// camera.
pub fn camera_input(input: &InputState, frame: &InputFrame) -> CameraInput {
    if input.modifiers.ctrl {
        return CameraInput::default();
    }
    let axis = |pos: Key, neg: Key| -> f32 {
        (input.key_down(pos) as i32 - input.key_down(neg) as i32) as f32
    };
    CameraInput {
        forward: axis(Key::W, Key::S),
        right: axis(Key::D, Key::A),
        up: axis(Key::Space, Key::Shift),
        yaw: axis(Key::ArrowRight, Key::ArrowLeft),
        pitch: axis(Key::ArrowUp, Key::ArrowDown),
        zoom: frame.wheel_lines,
    }
}

/// One line per binding, for the startup log.
pub fn help_lines() -> Vec<String> {
    let mut lines: Vec<String> = BINDINGS
        .iter()
        .map(|b| {
            let ctrl = if b.ctrl { "Ctrl+" } else { "" };
            format!("{ctrl}{}: {}", b.key, b.help)
        })
        .collect();
    lines.push("W A S D / Space / Shift: move, arrows: look, wheel: zoom".to_string());
    lines.push("left click: pick an apple or the lamp".to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: Key, ctrl: bool, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers { ctrl, ..Default::default() },
            repeat,
        }
    }

    #[test]
    fn table_has_no_duplicate_chords() {
        for (i, a) in BINDINGS.iter().enumerate() {
            for b in &BINDINGS[i + 1..] {
                assert!(!(a.key == b.key && a.ctrl == b.ctrl), "{:?} bound twice", a.key);
            }
        }
    }

    #[test]
    fn presses_map_in_order() {
        let events = [
            press(Key::R, false, false),
            press(Key::G, false, false),
            press(Key::Digit0, true, false),
            press(Key::L, false, false),
        ];
        assert_eq!(
            actions(&events),
            vec![Action::Regrow, Action::ToggleGravity, Action::CycleCamera, Action::ToggleLamp]
        );
    }

    #[test]
    fn repeats_releases_and_wrong_modifiers_are_ignored() {
        let events = [
            press(Key::R, false, true),
            InputEvent::Key {
                key: Key::M,
                state: KeyState::Released,
                modifiers: Modifiers::default(),
                repeat: false,
            },
            press(Key::Digit0, false, false),
            press(Key::C, true, false),
        ];
        assert!(actions(&events).is_empty());
    }

    #[test]
    fn held_keys_drive_camera_axes() {
        let mut input = InputState::default();
        let frame = InputFrame::default();
        input.keys_down.insert(Key::W);
        input.keys_down.insert(Key::A);
        input.keys_down.insert(Key::ArrowUp);
        let c = camera_input(&input, &frame);
        assert_eq!(c.forward, 1.0);
        assert_eq!(c.right, -1.0);
        assert_eq!(c.pitch, 1.0);
        assert_eq!(c.up, 0.0);

        input.keys_down.insert(Key::S);
        assert_eq!(camera_input(&input, &frame).forward, 0.0);

        input.modifiers.ctrl = true;
        assert!(camera_input(&input, &frame).is_idle());
    }

    #[test]
    fn wheel_lines_become_zoom() {
        let input = InputState::default();
        let frame = InputFrame { wheel_lines: -1.5, ..Default::default() };
        assert_eq!(camera_input(&input, &frame).zoom, -1.5);

        let mut held = InputState::default();
        held.modifiers.ctrl = true;
        assert!(camera_input(&held, &frame).is_idle());
    }

    #[test]
    fn help_mentions_every_binding() {
        let lines = help_lines();
        assert!(lines.iter().any(|l| l.starts_with("Ctrl+Digit0")));
        assert!(lines.len() >= BINDINGS.len());
    }
}
