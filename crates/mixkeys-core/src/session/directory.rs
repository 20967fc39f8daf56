//! Name-based lookup of live audio sessions.

use crate::{
    ApplicationIdentity,
    session::{AudioBackend, SessionHandle},
};

use std::{collections::HashSet, sync::Arc};

use tracing::{debug, instrument, trace};

/// Resolves application names to live sessions.
///
/// Holds no state besides the backend: every call reflects what the OS
/// reports right now. Query failures are absorbed and reported as "nothing
/// found", since a missing session is an ordinary condition for callers.
#[derive(Clone)]
pub struct SessionDirectory {
    backend: Arc<dyn AudioBackend>,
}

impl SessionDirectory {
    /// Wrap an audio backend.
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self { backend }
    }

    /// Distinct application names with a live session.
    ///
    /// Names are deduplicated case-insensitively; the first spelling in
    /// enumeration order wins.
    #[instrument(skip(self))]
    pub fn list_active_applications(&self) -> Vec<ApplicationIdentity> {
        let mut seen = HashSet::new();

        self.query()
            .iter()
            .map(|session| ApplicationIdentity::new(session.process_name()))
            .filter(|app| seen.insert(app.clone()))
            .collect()
    }

    /// First session whose process name matches `app`, ignoring case.
    #[instrument(skip(self), fields(app = %app))]
    pub fn resolve(&self, app: &ApplicationIdentity) -> Option<SessionHandle> {
        let session = self
            .query()
            .into_iter()
            .find(|session| app.matches(session.process_name()));

        if session.is_none() {
            trace!("No live session");
        }

        session
    }

    fn query(&self) -> Vec<SessionHandle> {
        match self.backend.sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                debug!(error = ?e, "Session query failed, treating as empty");
                Vec::new()
            }
        }
    }
}
