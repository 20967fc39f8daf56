/// Tray icon states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Normal operation.
    Idle,
    /// Waiting for the user to press a hotkey to bind.
    Capturing,
}
