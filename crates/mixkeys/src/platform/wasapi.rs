//! Audio sessions on the default render endpoint via WASAPI.

use mixkeys_core::{AudioBackend, AudioSession, CoreError, CoreResult, SessionHandle};

use std::{cell::Cell, panic::Location, path::Path};

use error_location::ErrorLocation;
use tracing::{debug, trace};
use windows::{
    Win32::{
        Foundation::{CloseHandle, RPC_E_CHANGED_MODE},
        Media::Audio::{
            IAudioSessionControl2, IAudioSessionManager2, IMMDeviceEnumerator,
            ISimpleAudioVolume, MMDeviceEnumerator, eConsole, eRender,
        },
        System::{
            Com::{CLSCTX_ALL, CoCreateInstance, CoInitializeEx, COINIT_MULTITHREADED},
            Threading::{
                OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
                QueryFullProcessImageNameW,
            },
        },
    },
    core::{Interface, PWSTR},
};

const IMAGE_PATH_CAPACITY: usize = 1024;

thread_local! {
    static COM_READY: Cell<bool> = const { Cell::new(false) };
}

/// Initialize COM on the calling thread once.
///
/// Calls come from blocking-pool threads that live as long as the runtime,
/// so COM is never uninitialized.
#[track_caller]
fn ensure_com() -> CoreResult<()> {
    if COM_READY.get() {
        return Ok(());
    }

    let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
    if hr.is_err() && hr != RPC_E_CHANGED_MODE {
        return Err(CoreError::CapabilityUnavailable {
            capability: "audio sessions",
            reason: format!("COM initialization failed: {}", hr.message()),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    COM_READY.set(true);
    Ok(())
}

/// Enumerates sessions of the default console render device.
pub(super) struct WasapiBackend;

impl WasapiBackend {
    /// Create the backend and check that the session API answers.
    #[track_caller]
    pub(super) fn new() -> CoreResult<Self> {
        let backend = Self;
        let sessions = backend.sessions().map_err(|e| CoreError::CapabilityUnavailable {
            capability: "audio sessions",
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;
        debug!(sessions = sessions.len(), "Audio session backend ready");
        Ok(backend)
    }
}

impl AudioBackend for WasapiBackend {
    #[track_caller]
    fn sessions(&self) -> CoreResult<Vec<SessionHandle>> {
        ensure_com()?;

        let query_failed = |e: windows::core::Error| CoreError::SessionQueryFailed {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        };

        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(query_failed)?;

            let device = enumerator
                .GetDefaultAudioEndpoint(eRender, eConsole)
                .map_err(query_failed)?;

            let manager = device
                .Activate::<IAudioSessionManager2>(CLSCTX_ALL, None)
                .map_err(query_failed)?;

            let sessions = manager.GetSessionEnumerator().map_err(query_failed)?;
            let count = sessions.GetCount().map_err(query_failed)?;

            let mut handles: Vec<SessionHandle> = Vec::new();

            for index in 0..count {
                let Ok(control) = sessions.GetSession(index) else {
                    continue;
                };
                let Ok(control2) = control.cast::<IAudioSessionControl2>() else {
                    continue;
                };

                // The system sounds session has no owning process.
                let pid = match control2.GetProcessId() {
                    Ok(0) | Err(_) => continue,
                    Ok(pid) => pid,
                };

                let Some(name) = process_name(pid) else {
                    trace!(pid, "Skipping session without a readable process name");
                    continue;
                };

                let Ok(volume) = control.cast::<ISimpleAudioVolume>() else {
                    continue;
                };

                handles.push(Box::new(WasapiSession { name, volume }));
            }

            Ok(handles)
        }
    }
}

/// Executable file name of `pid`, e.g. `Spotify.exe`.
fn process_name(pid: u32) -> Option<String> {
    unsafe {
        let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;

        let mut buffer = [0u16; IMAGE_PATH_CAPACITY];
        let mut len = buffer.len() as u32;
        let queried = QueryFullProcessImageNameW(
            process,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut len,
        );
        let _ = CloseHandle(process);
        queried.ok()?;

        let path = String::from_utf16_lossy(&buffer[..len as usize]);
        Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

struct WasapiSession {
    name: String,
    volume: ISimpleAudioVolume,
}

impl WasapiSession {
    #[track_caller]
    fn failed(&self, e: windows::core::Error) -> CoreError {
        CoreError::SessionOperationFailed {
            app: self.name.clone(),
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl AudioSession for WasapiSession {
    fn process_name(&self) -> &str {
        &self.name
    }

    fn volume(&self) -> CoreResult<f32> {
        unsafe { self.volume.GetMasterVolume() }.map_err(|e| self.failed(e))
    }

    fn set_volume(&self, level: f32) -> CoreResult<()> {
        unsafe { self.volume.SetMasterVolume(level, std::ptr::null()) }.map_err(|e| self.failed(e))
    }

    fn is_muted(&self) -> CoreResult<bool> {
        unsafe { self.volume.GetMute() }
            .map(|muted| muted.as_bool())
            .map_err(|e| self.failed(e))
    }

    fn set_muted(&self, muted: bool) -> CoreResult<()> {
        unsafe { self.volume.SetMute(muted, std::ptr::null()) }.map_err(|e| self.failed(e))
    }
}
