use error_location::ErrorLocation;
use thiserror::Error;

/// Errors raised by the volume control core, with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Enumerating audio sessions failed.
    #[error("Session query failed: {reason} {location}")]
    SessionQueryFailed {
        /// Description of the query failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading or writing a single session's volume or mute failed.
    #[error("Session operation failed for {app}: {reason} {location}")]
    SessionOperationFailed {
        /// Application owning the session.
        app: String,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An OS capability (audio, hotkeys, autostart) is not reachable.
    #[error("{capability} capability unavailable: {reason} {location}")]
    CapabilityUnavailable {
        /// Name of the missing capability.
        capability: &'static str,
        /// Why it is unavailable.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the config document to durable storage failed.
    #[error("Failed to persist config: {reason} {location}")]
    PersistenceFailed {
        /// Description of the write failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The config document on disk could not be parsed.
    #[error("Failed to parse config at {path:?}: {reason} {location}")]
    ConfigParseFailed {
        /// Path of the offending file.
        path: std::path::PathBuf,
        /// Parser message.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Installing a global hotkey hook failed.
    #[error("Hotkey registration failed for {combination}: {reason} {location}")]
    HotkeyRegistrationFailed {
        /// Key combination that could not be registered.
        combination: String,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Interactive hotkey capture was aborted.
    #[error("Hotkey capture failed: {reason} {location}")]
    CaptureFailed {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A key-combination string is empty or malformed.
    #[error("Invalid key combination {combination:?} {location}")]
    InvalidKeyCombination {
        /// The rejected input.
        combination: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            source,
            location: ErrorLocation::from(std::panic::Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
