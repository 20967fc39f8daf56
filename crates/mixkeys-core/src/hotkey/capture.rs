//! Interactive capture of an application's hotkey triple.

use crate::{
    ApplicationIdentity, ConfigStore, CoreResult, HotkeyAction, HotkeyTriple, KeyCombination,
};

use tracing::{info, instrument};

/// Source of user-pressed key combinations.
pub trait KeyCapture {
    /// Block until the user presses the combination for `action` of `app`.
    fn capture_next(
        &mut self,
        app: &ApplicationIdentity,
        action: HotkeyAction,
    ) -> CoreResult<KeyCombination>;
}

/// Prompt for volume up, volume down and mute in that order, then store all three.
///
/// The config is only touched once every combination has been captured; an
/// aborted capture leaves the previous triple in place.
#[instrument(skip(capture, store), fields(app = %app))]
pub fn capture_hotkeys<C: KeyCapture + ?Sized>(
    capture: &mut C,
    app: &ApplicationIdentity,
    store: &ConfigStore,
) -> CoreResult<HotkeyTriple> {
    let vol_up = capture.capture_next(app, HotkeyAction::VolumeUp)?;
    let vol_down = capture.capture_next(app, HotkeyAction::VolumeDown)?;
    let mute = capture.capture_next(app, HotkeyAction::ToggleMute)?;

    let triple = HotkeyTriple {
        vol_up,
        vol_down,
        mute,
    };

    store.set_hotkeys(app, triple.clone())?;

    info!(
        vol_up = %triple.vol_up,
        vol_down = %triple.vol_down,
        mute = %triple.mute,
        "Hotkeys captured"
    );

    Ok(triple)
}
