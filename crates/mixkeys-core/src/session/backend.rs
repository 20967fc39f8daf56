//! Capability interface onto the OS audio subsystem.

use crate::CoreResult;

/// One live per-application audio stream.
///
/// Handles are short-lived: obtain one from the
/// [`SessionDirectory`](crate::SessionDirectory) immediately before use and
/// drop it afterwards. Every call may fail independently.
pub trait AudioSession {
    /// Name of the owning process, e.g. `spotify.exe`.
    fn process_name(&self) -> &str;

    /// Linear volume scalar in `[0.0, 1.0]`.
    fn volume(&self) -> CoreResult<f32>;

    /// Write a linear volume scalar in `[0.0, 1.0]`.
    fn set_volume(&self, level: f32) -> CoreResult<()>;

    /// Current mute flag.
    fn is_muted(&self) -> CoreResult<bool>;

    /// Write the mute flag.
    fn set_muted(&self, muted: bool) -> CoreResult<()>;
}

/// Boxed session returned by a backend.
pub type SessionHandle = Box<dyn AudioSession>;

/// Enumerates the sessions that currently exist.
///
/// Implementations must be safe to query from several threads at once and
/// must not cache sessions between calls.
pub trait AudioBackend: Send + Sync {
    /// All sessions that have an owning process, in OS enumeration order.
    fn sessions(&self) -> CoreResult<Vec<SessionHandle>>;
}
