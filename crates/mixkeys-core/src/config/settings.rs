use crate::config::{default_auto_start, default_remember_volumes};

use serde::{Deserialize, Serialize};

/// User toggles that are independent of any application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Persist volume and mute changes per application.
    #[serde(default = "default_remember_volumes")]
    pub remember_volumes: bool,
    /// Launch at OS login.
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            remember_volumes: default_remember_volumes(),
            auto_start: default_auto_start(),
        }
    }
}
