use crate::{ApplicationIdentity, KeyCombination, VolumeCommand};

use std::fmt;

/// Volume step applied by the up/down hotkeys.
pub const HOTKEY_VOLUME_STEP: f32 = 0.1;

/// Action a hotkey performs on its application's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    /// Raise volume by [`HOTKEY_VOLUME_STEP`].
    VolumeUp,
    /// Lower volume by [`HOTKEY_VOLUME_STEP`].
    VolumeDown,
    /// Flip the mute flag.
    ToggleMute,
}

impl HotkeyAction {
    /// Capture order for the interactive binding flow.
    pub const ALL: [HotkeyAction; 3] = [
        HotkeyAction::VolumeUp,
        HotkeyAction::VolumeDown,
        HotkeyAction::ToggleMute,
    ];

    /// The engine command this action maps to.
    pub fn command(self) -> VolumeCommand {
        match self {
            HotkeyAction::VolumeUp => VolumeCommand::Adjust(HOTKEY_VOLUME_STEP),
            HotkeyAction::VolumeDown => VolumeCommand::Adjust(-HOTKEY_VOLUME_STEP),
            HotkeyAction::ToggleMute => VolumeCommand::ToggleMute,
        }
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HotkeyAction::VolumeUp => "VOLUME UP",
            HotkeyAction::VolumeDown => "VOLUME DOWN",
            HotkeyAction::ToggleMute => "MUTE",
        })
    }
}

/// The three combinations bound to one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyTriple {
    /// Combination for [`HotkeyAction::VolumeUp`].
    pub vol_up: KeyCombination,
    /// Combination for [`HotkeyAction::VolumeDown`].
    pub vol_down: KeyCombination,
    /// Combination for [`HotkeyAction::ToggleMute`].
    pub mute: KeyCombination,
}

impl HotkeyTriple {
    /// Combination bound to `action`.
    pub fn get(&self, action: HotkeyAction) -> &KeyCombination {
        match action {
            HotkeyAction::VolumeUp => &self.vol_up,
            HotkeyAction::VolumeDown => &self.vol_down,
            HotkeyAction::ToggleMute => &self.mute,
        }
    }
}

/// One key-combination bound to one action of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBinding {
    /// Target application.
    pub app: ApplicationIdentity,
    /// What the combination does.
    pub action: HotkeyAction,
    /// The bound combination.
    pub combination: KeyCombination,
}

/// Lifecycle of a (application, action) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// No combination configured.
    Unbound,
    /// Configured, but the application has no live session; pressing it is a no-op.
    BoundInactive,
    /// Configured and the application currently resolves to a session.
    BoundActive,
}
