use crate::{ConfigStore, CoreResult};

use tracing::{info, instrument, warn};

/// Capability that registers the executable to run at OS login.
pub trait Autostart: Send + Sync {
    /// Register for login start.
    fn enable(&self) -> CoreResult<()>;

    /// Remove the login registration. Succeeds if it was not registered.
    fn disable(&self) -> CoreResult<()>;

    /// Whether the registration currently exists.
    fn is_enabled(&self) -> CoreResult<bool>;
}

/// Apply a new autostart choice: call the capability first, persist the flag after.
///
/// If the capability fails the stored flag is left unchanged.
#[instrument(skip(autostart, store))]
pub fn set_autostart(autostart: &dyn Autostart, store: &ConfigStore, enabled: bool) -> CoreResult<()> {
    if enabled {
        autostart.enable()?;
    } else {
        autostart.disable()?;
    }

    store.set_auto_start(enabled)?;
    info!(enabled, "Autostart updated");
    Ok(())
}

/// Align the stored flag with what the OS actually has registered.
///
/// Returns the effective value. Capability errors leave the stored flag alone.
#[instrument(skip(autostart, store))]
pub fn sync_autostart(autostart: &dyn Autostart, store: &ConfigStore) -> bool {
    let stored = store.settings().auto_start;

    match autostart.is_enabled() {
        Ok(actual) if actual != stored => {
            if let Err(e) = store.set_auto_start(actual) {
                warn!(error = ?e, "Failed to store autostart flag");
            }
            actual
        }
        Ok(actual) => actual,
        Err(e) => {
            warn!(error = ?e, "Autostart state unavailable, keeping stored flag");
            stored
        }
    }
}
