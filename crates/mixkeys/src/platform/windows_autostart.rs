//! Login autostart through the per-user `Run` registry key.

use mixkeys_core::{Autostart, CoreError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::debug;
use windows::{
    Win32::{
        Foundation::ERROR_FILE_NOT_FOUND,
        System::Registry::{
            HKEY, HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SAM_FLAGS, REG_SZ, RegCloseKey,
            RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
        },
    },
    core::PCWSTR,
};

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
const VALUE_NAME: &str = "Mixkeys";

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

#[track_caller]
fn registry_error(reason: String) -> CoreError {
    CoreError::CapabilityUnavailable {
        capability: "autostart",
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Autostart entry under `HKCU\...\Run` pointing at the current executable.
pub(super) struct RegistryAutostart {
    run_key_path: Vec<u16>,
    value_name: Vec<u16>,
}

impl RegistryAutostart {
    pub(super) fn new() -> Self {
        Self {
            run_key_path: to_wide(RUN_KEY),
            value_name: to_wide(VALUE_NAME),
        }
    }

    #[track_caller]
    fn open_run_key(&self, access: REG_SAM_FLAGS) -> CoreResult<HKEY> {
        let mut hkey = HKEY::default();
        let result = unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                access,
                &mut hkey,
            )
        };

        if result.is_err() {
            return Err(registry_error(format!(
                "Failed to open Run key: {}",
                result.0
            )));
        }

        Ok(hkey)
    }
}

impl Autostart for RegistryAutostart {
    #[track_caller]
    fn enable(&self) -> CoreResult<()> {
        let exe_path = std::env::current_exe()?;
        let command = to_wide(&format!("\"{}\"", exe_path.to_string_lossy()));

        let hkey = self.open_run_key(KEY_WRITE)?;
        let result = unsafe {
            let data = std::slice::from_raw_parts(command.as_ptr() as *const u8, command.len() * 2);
            let result = RegSetValueExW(
                hkey,
                PCWSTR::from_raw(self.value_name.as_ptr()),
                0,
                REG_SZ,
                Some(data),
            );
            let _ = RegCloseKey(hkey);
            result
        };

        if result.is_err() {
            return Err(registry_error(format!(
                "Failed to write Run value: {}",
                result.0
            )));
        }

        debug!(exe_path = ?exe_path, "Run key value written");
        Ok(())
    }

    #[track_caller]
    fn disable(&self) -> CoreResult<()> {
        let hkey = self.open_run_key(KEY_WRITE)?;
        let result = unsafe {
            let result = RegDeleteValueW(hkey, PCWSTR::from_raw(self.value_name.as_ptr()));
            let _ = RegCloseKey(hkey);
            result
        };

        if result.is_err() && result != ERROR_FILE_NOT_FOUND {
            return Err(registry_error(format!(
                "Failed to delete Run value: {}",
                result.0
            )));
        }

        Ok(())
    }

    #[track_caller]
    fn is_enabled(&self) -> CoreResult<bool> {
        let hkey = self.open_run_key(KEY_READ)?;
        let mut data_size = 0u32;
        let result = unsafe {
            let result = RegQueryValueExW(
                hkey,
                PCWSTR::from_raw(self.value_name.as_ptr()),
                None,
                None,
                None,
                Some(&mut data_size),
            );
            let _ = RegCloseKey(hkey);
            result
        };

        Ok(result.is_ok() && data_size > 0)
    }
}
