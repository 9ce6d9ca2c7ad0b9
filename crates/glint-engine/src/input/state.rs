use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{ButtonState, InputEvent, Key, MouseButton};

/// Current input state for the demo window.
///
/// Holds "is down" information. Per-frame transitions are recorded into an
/// `InputFrame`.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies an input event to the current state and writes deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match &ev {
            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // On focus loss, clear "down" sets to avoid stuck keys/buttons.
                    self.keys_down.clear();
                    self.buttons_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                ButtonState::Pressed => {
                    if self.keys_down.insert(*key) {
                        frame.keys_pressed.insert(*key);
                    }
                }
                ButtonState::Released => {
                    self.keys_down.remove(key);
                }
            },

            InputEvent::PointerButton { button, state } => match state {
                ButtonState::Pressed => {
                    if self.buttons_down.insert(*button) {
                        frame.buttons_pressed.insert(*button);
                    }
                }
                ButtonState::Released => {
                    self.buttons_down.remove(button);
                }
            },
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

    fn click(state: ButtonState) -> InputEvent {
        InputEvent::PointerButton { button: MouseButton::Left, state }
    }

    #[test]
    fn press_is_reported_once_per_hold() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, click(ButtonState::Pressed));
        assert!(frame.button_pressed(MouseButton::Left));
        assert!(state.button_down(MouseButton::Left));

        frame.clear();
        state.apply_event(&mut frame, click(ButtonState::Pressed));
        assert!(!frame.button_pressed(MouseButton::Left));

        state.apply_event(&mut frame, click(ButtonState::Released));
        assert!(!state.button_down(MouseButton::Left));
        assert_eq!(frame.events.len(), 2);
    }

    #[test]
    fn key_repeat_does_not_retrigger() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();
        let space = |repeat| InputEvent::Key {
            key: Key::Space,
            state: ButtonState::Pressed,
            repeat,
        };

        state.apply_event(&mut frame, space(false));
        frame.clear();
        state.apply_event(&mut frame, space(true));
        assert!(!frame.key_pressed(Key::Space));
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut state = InputState::default();
        let mut frame = InputFrame::default();

        state.apply_event(&mut frame, click(ButtonState::Pressed));
        state.apply_event(&mut frame, InputEvent::Focused(false));

        assert!(state.buttons_down.is_empty());
        assert!(!state.focused);
    }
}
