use crate::{
    ApplicationIdentity, ConfigStore, CoreResult, SessionDirectory, VolumeCommand, VolumeEngine,
    VolumeOutcome,
};

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

/// Resolves an application, runs a volume command on it and remembers the result.
///
/// This is the single entry point for every user-initiated mutation, whether
/// it comes from a hotkey or from the UI.
pub struct VolumeController {
    directory: SessionDirectory,
    engine: VolumeEngine,
    store: Arc<ConfigStore>,
}

impl VolumeController {
    /// Build a controller over a directory and a config store.
    pub fn new(directory: SessionDirectory, store: Arc<ConfigStore>) -> Self {
        Self {
            directory,
            engine: VolumeEngine::new(),
            store,
        }
    }

    /// Run `command` against the current session of `app`.
    ///
    /// Returns `Ok(None)` when the application has no live session. A failed
    /// config write after a successful mutation is logged and reported by the
    /// store; the mutation result is still returned.
    #[instrument(skip(self), fields(app = %app))]
    pub fn apply(
        &self,
        app: &ApplicationIdentity,
        command: VolumeCommand,
    ) -> CoreResult<Option<VolumeOutcome>> {
        let session = self.directory.resolve(app);
        let Some(outcome) = self.engine.apply(session.as_deref(), command)? else {
            debug!("No session, command ignored");
            return Ok(None);
        };

        if let Err(e) = self.store.remember(app, outcome) {
            warn!(error = ?e, "Failed to remember volume state");
        }

        Ok(Some(outcome))
    }

    /// Re-apply the remembered volume and mute of `app` to its live session.
    ///
    /// Does nothing unless remembering is enabled and something was remembered.
    /// Returns whether a session was updated.
    #[instrument(skip(self), fields(app = %app))]
    pub fn restore_remembered(&self, app: &ApplicationIdentity) -> CoreResult<bool> {
        if !self.store.settings().remember_volumes {
            return Ok(false);
        }

        let Some(entry) = self.store.entry(app) else {
            return Ok(false);
        };

        if entry.volume.is_none() && entry.muted.is_none() {
            return Ok(false);
        }

        let session = self.directory.resolve(app);
        let session = session.as_deref();
        if session.is_none() {
            return Ok(false);
        }

        if let Some(level) = entry.volume {
            self.engine.set_volume(session, i32::from(level))?;
        }
        if let Some(muted) = entry.muted {
            self.engine.set_mute(session, muted)?;
        }

        info!(volume = ?entry.volume, muted = ?entry.muted, "Remembered state restored");

        Ok(true)
    }

    /// The directory this controller resolves through.
    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    /// The config store results are remembered in.
    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }
}
