use mixkeys_core::{Autostart, CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;

#[track_caller]
pub(super) fn unavailable(capability: &'static str) -> CoreError {
    CoreError::CapabilityUnavailable {
        capability,
        reason: format!("Not supported on {}", std::env::consts::OS),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Autostart on platforms without an implementation.
pub(super) struct UnsupportedAutostart;

impl Autostart for UnsupportedAutostart {
    fn enable(&self) -> CoreResult<()> {
        Err(unavailable("autostart"))
    }

    fn disable(&self) -> CoreResult<()> {
        Err(unavailable("autostart"))
    }

    fn is_enabled(&self) -> CoreResult<bool> {
        Err(unavailable("autostart"))
    }
}
