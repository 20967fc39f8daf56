//! Volume and mute operations on a resolved session.

use crate::{
    CoreResult, VolumeCommand, VolumeOutcome,
    session::AudioSession,
    volume::{percent_to_scalar, scalar_to_percent},
};

use std::sync::Mutex;

use tracing::{debug, instrument};

/// Applies volume commands to session handles.
///
/// Every operation is a no-op returning `Ok(None)` when there is no session.
/// Read-modify-write sequences are serialized across all callers sharing one
/// engine, so two concurrent `+0.1` adjustments both land.
#[derive(Default)]
pub struct VolumeEngine {
    guard: Mutex<()>,
}

impl VolumeEngine {
    /// Create an engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the current volume, clamped to `[0.0, 1.0]`.
    #[instrument(skip(self, session))]
    pub fn adjust_volume(
        &self,
        session: Option<&dyn AudioSession>,
        delta: f32,
    ) -> CoreResult<Option<f32>> {
        let Some(session) = session else {
            return Ok(None);
        };

        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let current = session.volume()?;
        let level = (current + delta).clamp(0.0, 1.0);
        session.set_volume(level)?;

        debug!(app = session.process_name(), from = current, to = level, "Volume adjusted");

        Ok(Some(level))
    }

    /// Set an absolute level on the 0-100 scale.
    #[instrument(skip(self, session))]
    pub fn set_volume(&self, session: Option<&dyn AudioSession>, level: i32) -> CoreResult<Option<f32>> {
        let Some(session) = session else {
            return Ok(None);
        };

        let scalar = percent_to_scalar(level);

        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        session.set_volume(scalar)?;

        debug!(app = session.process_name(), level = scalar, "Volume set");

        Ok(Some(scalar))
    }

    /// Negate the current mute flag.
    #[instrument(skip(self, session))]
    pub fn toggle_mute(&self, session: Option<&dyn AudioSession>) -> CoreResult<Option<bool>> {
        let Some(session) = session else {
            return Ok(None);
        };

        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        let muted = !session.is_muted()?;
        session.set_muted(muted)?;

        debug!(app = session.process_name(), muted, "Mute toggled");

        Ok(Some(muted))
    }

    /// Write an explicit mute flag.
    #[instrument(skip(self, session))]
    pub fn set_mute(&self, session: Option<&dyn AudioSession>, muted: bool) -> CoreResult<Option<bool>> {
        let Some(session) = session else {
            return Ok(None);
        };

        let _guard = self.guard.lock().unwrap_or_else(|e| e.into_inner());
        session.set_muted(muted)?;

        Ok(Some(muted))
    }

    /// Dispatch a [`VolumeCommand`].
    pub fn apply(
        &self,
        session: Option<&dyn AudioSession>,
        command: VolumeCommand,
    ) -> CoreResult<Option<VolumeOutcome>> {
        let outcome = match command {
            VolumeCommand::Adjust(delta) => self
                .adjust_volume(session, delta)?
                .map(|level| VolumeOutcome::Volume(scalar_to_percent(level))),
            VolumeCommand::Set(level) => self
                .set_volume(session, level)?
                .map(|level| VolumeOutcome::Volume(scalar_to_percent(level))),
            VolumeCommand::ToggleMute => self.toggle_mute(session)?.map(VolumeOutcome::Muted),
        };

        Ok(outcome)
    }
}
