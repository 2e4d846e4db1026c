//! Keyboard stand-in for the source tracker.
//!
//! Until a real tracker is attached, a digit key reports that many detected
//! sources: `0` rains, `1` suspends, `2` and up reverses. Top-row and numpad
//! digits both work. Holding a key does not re-report it.

use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::signal::ControlSignal;

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Report this many detected sources.
    ReportSources(u32),
    /// Close the window.
    Quit,
}

/// Map a physical key to its action, if any.
pub fn action_for_key(key: KeyCode) -> Option<KeyAction> {
    let count = match key {
        KeyCode::Digit0 | KeyCode::Numpad0 => 0,
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        KeyCode::Escape => return Some(KeyAction::Quit),
        _ => return None,
    };
    Some(KeyAction::ReportSources(count))
}

/// Feeds keyboard digits into a [`ControlSignal`].
#[derive(Debug)]
pub struct KeyboardSource {
    signal: ControlSignal,
    keys_held: HashSet<KeyCode>,
}

impl KeyboardSource {
    pub fn new(signal: ControlSignal) -> Self {
        Self {
            signal,
            keys_held: HashSet::new(),
        }
    }

    /// A key went down. Returns the action on the first press only.
    pub fn press(&mut self, key: KeyCode) -> Option<KeyAction> {
        // No repeat while held
        if !self.keys_held.insert(key) {
            return None;
        }
        let action = action_for_key(key)?;
        if let KeyAction::ReportSources(count) = action {
            log::debug!("Keyboard reports {} source(s)", count);
            self.signal.report_source_count(count);
        }
        Some(action)
    }

    /// A key went up.
    pub fn release(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    /// Process a winit window event.
    pub(crate) fn handle_event(&mut self, event: &WindowEvent) -> Option<KeyAction> {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return None;
        };
        let PhysicalKey::Code(key) = event.physical_key else {
            return None;
        };
        match event.state {
            ElementState::Pressed => self.press(key),
            ElementState::Released => {
                self.release(key);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::Regime;

    #[test]
    fn test_digit_mapping() {
        assert_eq!(action_for_key(KeyCode::Digit0), Some(KeyAction::ReportSources(0)));
        assert_eq!(action_for_key(KeyCode::Numpad2), Some(KeyAction::ReportSources(2)));
        assert_eq!(action_for_key(KeyCode::Digit9), Some(KeyAction::ReportSources(9)));
        assert_eq!(action_for_key(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(action_for_key(KeyCode::KeyA), None);
    }

    #[test]
    fn test_press_reports_to_signal() {
        let signal = ControlSignal::new();
        let mut keyboard = KeyboardSource::new(signal.clone());

        keyboard.press(KeyCode::Digit1);
        assert_eq!(signal.load(), Regime::Suspended);

        keyboard.press(KeyCode::Digit3);
        assert_eq!(signal.load(), Regime::Reverse);
    }

    #[test]
    fn test_held_key_does_not_repeat() {
        let signal = ControlSignal::new();
        let mut keyboard = KeyboardSource::new(signal.clone());

        assert!(keyboard.press(KeyCode::Digit1).is_some());
        // Something else moves the signal while the key stays down
        signal.report_source_count(0);
        assert!(keyboard.press(KeyCode::Digit1).is_none());
        assert_eq!(signal.load(), Regime::Normal);

        keyboard.release(KeyCode::Digit1);
        assert!(keyboard.press(KeyCode::Digit1).is_some());
        assert_eq!(signal.load(), Regime::Suspended);
    }

    #[test]
    fn test_quit_leaves_signal_alone() {
        let signal = ControlSignal::new();
        signal.report_source_count(2);
        let mut keyboard = KeyboardSource::new(signal.clone());

        assert_eq!(keyboard.press(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(signal.load(), Regime::Reverse);
    }
}
