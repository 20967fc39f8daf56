//! Reads live session state for the applications the UI is showing.

use crate::{
    ApplicationIdentity, CoreResult, SessionDirectory, session::AudioSession,
    volume::scalar_to_percent,
};

use tracing::{debug, instrument, trace};

/// Live state of one application as read from its session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Application the reading belongs to.
    pub app: ApplicationIdentity,
    /// Volume on the rounded 0-100 scale.
    pub volume: u8,
    /// Mute flag.
    pub muted: bool,
}

/// Produces [`Observation`]s for the reconciliation loop.
///
/// Only reads: it never writes to a session, and it never mutates UI state
/// itself. Observations are handed to the UI thread, which applies them to
/// its [`MixerView`](crate::MixerView).
#[derive(Clone)]
pub struct Reconciler {
    directory: SessionDirectory,
}

impl Reconciler {
    /// Read through `directory`.
    pub fn new(directory: SessionDirectory) -> Self {
        Self { directory }
    }

    /// Read the current state of each tracked application.
    ///
    /// Applications without a session, or whose reads fail, are skipped so
    /// their previously displayed state stays in place.
    #[instrument(skip_all, fields(tracked = tracked.len()))]
    pub fn poll(&self, tracked: &[ApplicationIdentity]) -> Vec<Observation> {
        tracked
            .iter()
            .filter_map(|app| {
                let Some(session) = self.directory.resolve(app) else {
                    trace!(app = %app, "Not resolvable this cycle");
                    return None;
                };

                match read(&*session) {
                    Ok((volume, muted)) => Some(Observation {
                        app: app.clone(),
                        volume,
                        muted,
                    }),
                    Err(e) => {
                        debug!(app = %app, error = ?e, "Failed to read session state");
                        None
                    }
                }
            })
            .collect()
    }
}

fn read(session: &dyn AudioSession) -> CoreResult<(u8, bool)> {
    let volume = scalar_to_percent(session.volume()?);
    let muted = session.is_muted()?;
    Ok((volume, muted))
}
