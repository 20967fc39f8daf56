//! OS capabilities: per-application audio sessions and login autostart.
//!
//! Only Windows has real implementations. Elsewhere both capabilities report
//! `CapabilityUnavailable` and the app keeps running with those features off.

#[cfg(target_os = "windows")]
mod wasapi;
#[cfg(target_os = "windows")]
mod windows_autostart;

#[cfg(not(target_os = "windows"))]
mod unsupported;

use mixkeys_core::{AudioBackend, Autostart, CoreResult};

use std::sync::Arc;

/// The per-application audio backend for this OS.
///
/// Probes the backend once so an unusable audio stack is reported at startup.
#[track_caller]
pub(crate) fn audio_backend() -> CoreResult<Arc<dyn AudioBackend>> {
    #[cfg(target_os = "windows")]
    {
        let backend = wasapi::WasapiBackend::new()?;
        Ok(Arc::new(backend))
    }

    #[cfg(not(target_os = "windows"))]
    {
        Err(unsupported::unavailable("per-application audio sessions"))
    }
}

/// The login autostart capability for this OS.
pub(crate) fn autostart() -> Arc<dyn Autostart> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows_autostart::RegistryAutostart::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(unsupported::UnsupportedAutostart)
    }
}
