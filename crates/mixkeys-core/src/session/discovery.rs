//! Detection of applications whose session just appeared.

use crate::{ApplicationIdentity, Config, session::SessionDirectory};

use std::collections::HashSet;

use tracing::{debug, instrument};

/// Remembers which applications with remembered state were live on the last scan.
///
/// Each [`SessionDiscovery::scan`] reports the ones that resolve now but did
/// not before, so their remembered volume and mute can be re-applied once
/// per appearance.
#[derive(Debug, Default)]
pub struct SessionDiscovery {
    live: HashSet<ApplicationIdentity>,
}

impl SessionDiscovery {
    /// Start with nothing seen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applications with a remembered volume or mute whose session appeared since the last scan.
    ///
    /// Returned in config order. Reports nothing while remembering is
    /// disabled, so turning it on counts every live session as new.
    #[instrument(skip_all)]
    pub fn scan(&mut self, config: &Config, directory: &SessionDirectory) -> Vec<ApplicationIdentity> {
        let mut live = HashSet::new();
        let mut appeared = Vec::new();

        if !config.settings.remember_volumes {
            self.live = live;
            return appeared;
        }

        for (app, entry) in &config.apps {
            if entry.volume.is_none() && entry.muted.is_none() {
                continue;
            }
            if directory.resolve(app).is_none() {
                continue;
            }
            if !self.live.contains(app) {
                appeared.push(app.clone());
            }
            live.insert(app.clone());
        }

        if !appeared.is_empty() {
            debug!(appeared = appeared.len(), "Sessions appeared");
        }

        self.live = live;
        appeared
    }
}
