//! Shared, single-writer access to the config document.

use crate::{
    ApplicationIdentity, CoreError, CoreResult, HotkeyTriple, VolumeOutcome,
    config::{AppEntry, Config, GlobalSettings},
};

use std::{
    path::{Path, PathBuf},
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::{info, instrument, warn};

type FailureReporter = Box<dyn Fn(&CoreError) + Send + Sync>;

/// Owns the in-memory config and its durable file.
///
/// Every mutation is applied in memory and flushed to disk while the lock is
/// held, so concurrent writers never interleave partial files. When a flush
/// fails the in-memory document stays authoritative and the next successful
/// mutation (or [`ConfigStore::flush`]) writes it out.
pub struct ConfigStore {
    path: PathBuf,
    config: Mutex<Config>,
    write_failing: AtomicBool,
    on_failure: Option<FailureReporter>,
}

impl ConfigStore {
    /// Load the document at `path`, falling back to defaults if it does not exist.
    #[track_caller]
    #[instrument]
    pub fn open(path: &Path) -> CoreResult<Self> {
        let config = Config::load_from(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            config: Mutex::new(config),
            write_failing: AtomicBool::new(false),
            on_failure: None,
        })
    }

    /// Install a callback invoked once at the start of each run of failed writes.
    pub fn with_failure_reporter(
        mut self,
        reporter: impl Fn(&CoreError) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(reporter));
        self
    }

    /// Location of the durable document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Config {
        self.lock().clone()
    }

    /// Current global settings.
    pub fn settings(&self) -> GlobalSettings {
        self.lock().settings
    }

    /// Persisted state for one application.
    pub fn entry(&self, app: &ApplicationIdentity) -> Option<AppEntry> {
        self.lock().apps.get(app).cloned()
    }

    /// Replace the hotkey triple of `app` and persist.
    #[instrument(skip(self))]
    pub fn set_hotkeys(&self, app: &ApplicationIdentity, triple: HotkeyTriple) -> CoreResult<()> {
        self.mutate(|config| {
            config
                .apps
                .entry(app.clone())
                .or_default()
                .set_hotkeys(triple);
        })?;

        info!(app = %app, "Hotkeys saved");
        Ok(())
    }

    /// Record the result of a volume operation if remembering is enabled.
    ///
    /// Returns `Ok(false)` without touching the file when remembering is off.
    #[instrument(skip(self))]
    pub fn remember(&self, app: &ApplicationIdentity, outcome: VolumeOutcome) -> CoreResult<bool> {
        if !self.settings().remember_volumes {
            return Ok(false);
        }

        self.mutate(|config| {
            let entry = config.apps.entry(app.clone()).or_default();
            match outcome {
                VolumeOutcome::Volume(level) => entry.volume = Some(level),
                VolumeOutcome::Muted(muted) => entry.muted = Some(muted),
            }
        })?;

        Ok(true)
    }

    /// Toggle persistence of per-application levels.
    #[instrument(skip(self))]
    pub fn set_remember_volumes(&self, enabled: bool) -> CoreResult<()> {
        self.mutate(|config| config.settings.remember_volumes = enabled)
    }

    /// Record whether the app starts at login.
    #[instrument(skip(self))]
    pub fn set_auto_start(&self, enabled: bool) -> CoreResult<()> {
        self.mutate(|config| config.settings.auto_start = enabled)
    }

    /// Re-read the document from disk, replacing the in-memory copy.
    ///
    /// On a read or parse error the current in-memory copy is kept.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn reload(&self) -> CoreResult<()> {
        let fresh = Config::load_from(&self.path)?;
        *self.lock() = fresh;
        info!(config_path = ?self.path, "Configuration reloaded");
        Ok(())
    }

    /// Write the in-memory document out again.
    #[instrument(skip(self))]
    pub fn flush(&self) -> CoreResult<()> {
        let config = self.lock();
        self.write(&config)
    }

    fn mutate(&self, f: impl FnOnce(&mut Config)) -> CoreResult<()> {
        let mut config = self.lock();
        f(&mut config);
        self.write(&config)
    }

    fn write(&self, config: &Config) -> CoreResult<()> {
        match config.save_to(&self.path) {
            Ok(()) => {
                if self.write_failing.swap(false, Ordering::AcqRel) {
                    info!(config_path = ?self.path, "Config writes recovered");
                }
                Ok(())
            }
            Err(e) => {
                if !self.write_failing.swap(true, Ordering::AcqRel) {
                    warn!(error = ?e, "Config write failed, keeping in-memory state");
                    if let Some(report) = &self.on_failure {
                        report(&e);
                    }
                }
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Config> {
        self.config.lock().unwrap_or_else(|e| e.into_inner())
    }
}
