use mixkeys_core::{ApplicationIdentity, VolumeCommand};

/// Commands handled by the application loop on the async runtime.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// A registered global hotkey was pressed.
    HotkeyPressed {
        /// Id reported by the hotkey event.
        hotkey_id: u32,
    },
    /// Run a volume command against one application.
    Volume {
        /// Target application.
        app: ApplicationIdentity,
        /// What to do.
        command: VolumeCommand,
    },
    /// Re-apply remembered volume and mute to one application.
    Restore {
        /// Target application.
        app: ApplicationIdentity,
    },
    /// Rebuild the tracked application list from the live sessions.
    Refresh,
    /// Interactively capture the three hotkeys of one application.
    CaptureHotkeys {
        /// Application being bound.
        app: ApplicationIdentity,
    },
    /// Flip the remember-volumes setting.
    ToggleRemember,
    /// Flip the start-at-login setting.
    ToggleAutostart,
    /// Re-read the config document from disk.
    ReloadConfig,
    /// Open the config document in the default editor.
    OpenConfig,
    /// Request application shutdown.
    Shutdown,
}
