//! Turns raw key events into a key-combination string.

use mixkeys_core::KeyCombination;

use std::{collections::BTreeSet, str::FromStr};

use global_hotkey::hotkey::HotKey;
use tao::{event::ElementState, keyboard::KeyCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Super,
}

impl Modifier {
    fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ControlLeft | KeyCode::ControlRight => Some(Modifier::Ctrl),
            KeyCode::AltLeft | KeyCode::AltRight => Some(Modifier::Alt),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Modifier::Shift),
            KeyCode::SuperLeft | KeyCode::SuperRight => Some(Modifier::Super),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Modifier::Ctrl => "ctrl",
            Modifier::Alt => "alt",
            Modifier::Shift => "shift",
            Modifier::Super => "super",
        }
    }
}

/// Tracks held modifiers and produces a chord on the first non-modifier press.
///
/// Modifiers are tracked all the time so a chord started before the capture
/// prompt appeared still records correctly.
#[derive(Debug, Default)]
pub struct ChordRecorder {
    held: BTreeSet<Modifier>,
}

impl ChordRecorder {
    /// Create a recorder with no modifiers held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw key event.
    ///
    /// Returns the chord when a non-modifier key is pressed and the result is
    /// something the hotkey backend can register. Keys it cannot register are
    /// ignored so the user can simply press another one.
    pub fn record(&mut self, key: KeyCode, state: ElementState) -> Option<KeyCombination> {
        let pressed = state == ElementState::Pressed;

        if let Some(modifier) = Modifier::from_key(key) {
            if pressed {
                self.held.insert(modifier);
            } else {
                self.held.remove(&modifier);
            }
            return None;
        }

        if !pressed || matches!(key, KeyCode::Unidentified(_)) {
            return None;
        }

        let key_name = format!("{key:?}").to_ascii_lowercase();
        let chord = self
            .held
            .iter()
            .map(|m| m.name())
            .chain(std::iter::once(key_name.as_str()))
            .collect::<Vec<_>>()
            .join("+");

        HotKey::from_str(&chord).ok()?;
        KeyCombination::parse(&chord).ok()
    }
}
