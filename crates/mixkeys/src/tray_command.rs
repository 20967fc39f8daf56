use mixkeys_core::{
    ApplicationIdentity, Config, GlobalSettings, HotkeyAction, KeyCombination, Observation,
};

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`), the
/// `GlobalHotKeyManager` and the `MixerView`, so every change to them flows
/// through this enum.
#[derive(Debug)]
pub enum TrayCommand {
    /// Replace the tracked application set.
    Track {
        /// Applications to show.
        apps: Vec<ApplicationIdentity>,
        /// Config snapshot for hotkey labels.
        config: Box<Config>,
    },
    /// Live state read by the reconciliation worker.
    Observed(Vec<Observation>),
    /// Make sure hooks exist for these combinations.
    InstallHotkeys(Vec<KeyCombination>),
    /// Start recording the next chord for one capture step.
    BeginCapture {
        /// Application being bound.
        app: ApplicationIdentity,
        /// Action being bound.
        action: HotkeyAction,
        /// Where the recorded chord goes.
        reply: std::sync::mpsc::Sender<KeyCombination>,
    },
    /// The capture flow finished or failed.
    EndCapture,
    /// Settings changed; refresh check marks.
    Settings(GlobalSettings),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
