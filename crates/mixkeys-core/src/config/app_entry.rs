use crate::{HotkeyAction, HotkeyTriple, KeyCombination};

use serde::{Deserialize, Serialize};

/// Persisted state for one application: its hotkeys and remembered levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    /// Combination raising the volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vol_up: Option<KeyCombination>,
    /// Combination lowering the volume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vol_down: Option<KeyCombination>,
    /// Combination toggling mute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<KeyCombination>,
    /// Remembered volume, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
    /// Remembered mute flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
}

impl AppEntry {
    /// Combination bound to `action`, if any.
    pub fn binding(&self, action: HotkeyAction) -> Option<&KeyCombination> {
        match action {
            HotkeyAction::VolumeUp => self.vol_up.as_ref(),
            HotkeyAction::VolumeDown => self.vol_down.as_ref(),
            HotkeyAction::ToggleMute => self.mute.as_ref(),
        }
    }

    /// Replace all three combinations, leaving remembered levels alone.
    pub fn set_hotkeys(&mut self, triple: HotkeyTriple) {
        self.vol_up = Some(triple.vol_up);
        self.vol_down = Some(triple.vol_down);
        self.mute = Some(triple.mute);
    }

    /// Short human-readable summary of the bound combinations.
    pub fn hotkey_label(&self) -> Option<String> {
        let parts: Vec<String> = HotkeyAction::ALL
            .iter()
            .filter_map(|&action| self.binding(action).map(|c| format!("{action}: {c}")))
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
