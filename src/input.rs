// AccelLog — Button Input Manager
//
// Debounced single-click detection for the three watch buttons.  Designed to
// be polled every few milliseconds from the event loop; a click is reported
// when a debounced press is released.

use heapless::Vec;

use crate::config::*;
use crate::events::Button;

pub const BUTTONS: [Button; 3] = [Button::Up, Button::Select, Button::Down];

#[derive(Debug, Default)]
pub struct ClickDetector {
    // Debounce state
    last_raw: bool,
    last_change_ms: u64,

    button_down: bool,
}

impl ClickDetector {
    pub const fn new() -> Self {
        Self {
            last_raw: false,
            last_change_ms: 0,
            button_down: false,
        }
    }

    /// Feed the raw pressed level.  Returns `true` on a debounced release.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> bool {
        // ---- debounce filter ----
        if pressed != self.last_raw {
            self.last_change_ms = now_ms;
            self.last_raw = pressed;
        }
        if now_ms.saturating_sub(self.last_change_ms) < DEBOUNCE_MS {
            return false;
        }

        // ---- button pressed edge ----
        if pressed && !self.button_down {
            self.button_down = true;
            return false;
        }

        // ---- button released edge ----
        if !pressed && self.button_down {
            self.button_down = false;
            return true;
        }

        false
    }
}

#[derive(Debug, Default)]
pub struct InputManager {
    detectors: [ClickDetector; 3],
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll every button.  `is_pressed` reports the raw level for a button
    /// (already inverted for active-LOW wiring).
    pub fn update(&mut self, mut is_pressed: impl FnMut(Button) -> bool, now_ms: u64) -> Vec<Button, 3> {
        let mut clicks = Vec::new();
        for (detector, button) in self.detectors.iter_mut().zip(BUTTONS) {
            if detector.update(is_pressed(button), now_ms) {
                // Capacity equals the number of buttons.
                let _ = clicks.push(button);
            }
        }
        clicks
    }
}
