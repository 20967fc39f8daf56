//! UI-facing mixer state.

use crate::{ApplicationIdentity, Config, Observation};

use std::collections::HashMap;

use tracing::debug;

/// What the UI currently shows for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedState {
    /// Slider position, 0-100.
    pub volume: u8,
    /// Mute flag backing the mute button.
    pub muted: bool,
    /// Summary of the bound hotkeys, if any.
    pub hotkeys: Option<String>,
}

impl DisplayedState {
    /// Text for the mute button: the action it performs.
    pub fn mute_label(&self) -> &'static str {
        if self.muted { "Unmute" } else { "Mute" }
    }
}

/// A displayed value that reconciliation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayChange {
    /// New slider position.
    Volume {
        /// Affected application.
        app: ApplicationIdentity,
        /// New value, 0-100.
        volume: u8,
    },
    /// New mute flag.
    Muted {
        /// Affected application.
        app: ApplicationIdentity,
        /// New flag.
        muted: bool,
    },
}

type Listener = Box<dyn FnMut(&DisplayChange)>;

/// Observable per-application display state, owned by the UI thread.
///
/// Only [`MixerView::apply`] changes volume and mute, and only from OS
/// observations. Listeners run synchronously on the owning thread for each
/// change.
#[derive(Default)]
pub struct MixerView {
    apps: Vec<ApplicationIdentity>,
    displayed: HashMap<ApplicationIdentity, DisplayedState>,
    listeners: Vec<Listener>,
}

impl MixerView {
    /// Empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked application set.
    ///
    /// Applications that stay tracked keep their displayed state; new ones
    /// start at volume 0, unmuted, until the first observation arrives.
    pub fn track(&mut self, apps: Vec<ApplicationIdentity>) {
        self.displayed.retain(|app, _| apps.contains(app));
        for app in &apps {
            self.displayed.entry(app.clone()).or_default();
        }
        self.apps = apps;
        debug!(tracked = self.apps.len(), "Tracked applications updated");
    }

    /// Copy the hotkey summaries for every tracked application out of `config`.
    pub fn set_hotkey_labels(&mut self, config: &Config) {
        for (app, state) in self.displayed.iter_mut() {
            state.hotkeys = config.apps.get(app).and_then(|entry| entry.hotkey_label());
        }
    }

    /// Tracked applications in display order.
    pub fn list_applications(&self) -> &[ApplicationIdentity] {
        &self.apps
    }

    /// Displayed state of `app`.
    pub fn displayed(&self, app: &ApplicationIdentity) -> Option<&DisplayedState> {
        self.displayed.get(app)
    }

    /// Displayed slider value of `app`.
    pub fn displayed_volume(&self, app: &ApplicationIdentity) -> Option<u8> {
        self.displayed.get(app).map(|s| s.volume)
    }

    /// Displayed mute button label of `app`.
    pub fn displayed_mute_label(&self, app: &ApplicationIdentity) -> Option<&'static str> {
        self.displayed.get(app).map(DisplayedState::mute_label)
    }

    /// Register a callback run for every change made by [`MixerView::apply`].
    pub fn subscribe(&mut self, listener: impl FnMut(&DisplayChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Overwrite displayed values that differ from the observed OS state.
    ///
    /// Observations for applications that are no longer tracked are ignored.
    /// Returns the changes made, after notifying listeners.
    pub fn apply(&mut self, observations: &[Observation]) -> Vec<DisplayChange> {
        let mut changes = Vec::new();

        for observation in observations {
            let Some(state) = self.displayed.get_mut(&observation.app) else {
                continue;
            };

            if state.volume != observation.volume {
                state.volume = observation.volume;
                changes.push(DisplayChange::Volume {
                    app: observation.app.clone(),
                    volume: observation.volume,
                });
            }

            if state.muted != observation.muted {
                state.muted = observation.muted;
                changes.push(DisplayChange::Muted {
                    app: observation.app.clone(),
                    muted: observation.muted,
                });
            }
        }

        for change in &changes {
            for listener in &mut self.listeners {
                listener(change);
            }
        }

        changes
    }
}
