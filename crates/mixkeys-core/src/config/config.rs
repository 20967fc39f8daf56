//! The persisted config document.
//!
//! Handles reading and writing the TOML document with atomic write
//! operations. Path selection is left to the caller.

use crate::{
    ApplicationIdentity, CoreError, CoreResult, HotkeyAction, HotkeyBinding,
    config::{AppEntry, GlobalSettings},
};

use std::{collections::BTreeMap, fs, io::Write, panic::Location, path::Path};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Per-application state plus global settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Hotkeys and remembered levels keyed by application.
    #[serde(default)]
    pub apps: BTreeMap<ApplicationIdentity, AppEntry>,
    /// Global toggles.
    #[serde(default)]
    pub settings: GlobalSettings,
}

impl Config {
    /// Load the document at `path`, or the defaults when the file is absent.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            info!(config_path = ?path, "No config found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;

        let config: Config = toml::from_str(&contents).map_err(|e| CoreError::ConfigParseFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, apps = config.apps.len(), "Configuration loaded");

        Ok(config)
    }

    /// Save the document to `path` using an atomic write.
    ///
    /// Writes to a temporary file first, then renames, so a crash mid-write
    /// never leaves a truncated document behind.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> CoreResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| CoreError::PersistenceFailed {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| CoreError::PersistenceFailed {
                reason: format!("Failed to create config directory: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            debug!(config_dir = ?dir, "Created config directory");
        }

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| CoreError::PersistenceFailed {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| CoreError::PersistenceFailed {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| CoreError::PersistenceFailed {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| CoreError::PersistenceFailed {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Every configured (application, action, combination) triple.
    pub fn bindings(&self) -> impl Iterator<Item = HotkeyBinding> + '_ {
        self.apps.iter().flat_map(|(app, entry)| {
            HotkeyAction::ALL.into_iter().filter_map(move |action| {
                entry.binding(action).map(|combination| HotkeyBinding {
                    app: app.clone(),
                    action,
                    combination: combination.clone(),
                })
            })
        })
    }
}
