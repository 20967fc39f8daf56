//! OS hook registration backed by `global-hotkey`.

use crate::hotkey_handler::parse_hotkey;

use mixkeys_core::{CoreError, CoreResult, HotkeyHook, KeyCombination};

use std::panic::Location;

use error_location::ErrorLocation;
use global_hotkey::GlobalHotKeyManager;
use tracing::info;

/// Registers combinations with the OS.
///
/// Must live on the thread running the event loop so that `WM_HOTKEY`
/// messages are pumped on Windows. Dropping it unregisters every hook.
pub struct GlobalHotkeyHook {
    manager: GlobalHotKeyManager,
}

impl GlobalHotkeyHook {
    /// Wrap an existing manager.
    pub fn new(manager: GlobalHotKeyManager) -> Self {
        Self { manager }
    }
}

impl HotkeyHook for GlobalHotkeyHook {
    #[track_caller]
    fn register(&mut self, combination: &KeyCombination) -> CoreResult<()> {
        let hotkey = parse_hotkey(combination)?;

        self.manager
            .register(hotkey)
            .map_err(|e| CoreError::HotkeyRegistrationFailed {
                combination: combination.to_string(),
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(combination = %combination, hotkey_id = hotkey.id(), "Global hotkey registered");

        Ok(())
    }
}
