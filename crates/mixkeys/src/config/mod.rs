//! Location of the config document.

use crate::{AppError, AppResult};

use std::{fs, panic::Location, path::PathBuf};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use tracing::debug;

/// Environment variable that overrides the config file location.
pub(crate) const CONFIG_PATH_ENV: &str = "MIXKEYS_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve the config file path, creating the platform config directory if needed.
#[track_caller]
pub(crate) fn config_path() -> AppResult<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        debug!(config_path = ?path, "Using config path from environment");
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "mixkeys", "Mixkeys").ok_or_else(|| {
        AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let config_dir = proj_dirs.config_dir();

    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
        debug!(config_dir = ?config_dir, "Created config directory");
    }

    Ok(config_dir.join(CONFIG_FILE_NAME))
}
