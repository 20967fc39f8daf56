//! Hook installation and hotkey dispatch.
//!
//! Hooks are installed once per key combination and never torn down. A hook
//! whose application has no live session stays registered and simply resolves
//! to nothing when pressed. Dispatch always consults the current config, so a
//! combination dropped by a later capture becomes inert too.

use crate::{
    ApplicationIdentity, BindingState, Config, CoreResult, HotkeyAction, HotkeyBinding,
    KeyCombination, SessionDirectory, VolumeController,
};

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, instrument, warn};

/// Capability that registers a global key combination with the OS.
pub trait HotkeyHook {
    /// Register `combination`. Called at most once per combination by
    /// [`HotkeyBindingManager`] unless a previous attempt failed.
    fn register(&mut self, combination: &KeyCombination) -> CoreResult<()>;
}

/// Tracks which combinations have an OS hook and installs missing ones.
pub struct HotkeyBindingManager<H> {
    hook: H,
    installed: BTreeSet<KeyCombination>,
    refused: BTreeSet<KeyCombination>,
}

impl<H: HotkeyHook> HotkeyBindingManager<H> {
    /// Wrap a hook capability.
    pub fn new(hook: H) -> Self {
        Self {
            hook,
            installed: BTreeSet::new(),
            refused: BTreeSet::new(),
        }
    }

    /// Register every combination that does not have a hook yet.
    ///
    /// Safe to call repeatedly with the same input. Failures are retried on
    /// the next call; only the first failure per combination is a warning.
    /// Returns how many hooks were newly installed.
    #[instrument(skip(self, combinations), fields(requested = combinations.len()))]
    pub fn install(&mut self, combinations: &[KeyCombination]) -> usize {
        let mut added = 0;

        for combination in combinations {
            if self.installed.contains(combination) {
                continue;
            }

            match self.hook.register(combination) {
                Ok(()) => {
                    info!(combination = %combination, "Hotkey hook installed");
                    self.refused.remove(combination);
                    self.installed.insert(combination.clone());
                    added += 1;
                }
                Err(e) if self.refused.contains(combination) => {
                    debug!(combination = %combination, error = ?e, "Hotkey hook still refused");
                }
                Err(e) => {
                    warn!(combination = %combination, error = ?e, "Failed to install hotkey hook");
                    self.refused.insert(combination.clone());
                }
            }
        }

        added
    }

    /// Whether `combination` already has a hook.
    pub fn is_installed(&self, combination: &KeyCombination) -> bool {
        self.installed.contains(combination)
    }

    /// Whether the OS refused `combination` on the latest attempt.
    pub fn is_refused(&self, combination: &KeyCombination) -> bool {
        self.refused.contains(combination)
    }

    /// Number of installed hooks.
    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    /// The wrapped capability.
    pub fn hook(&self) -> &H {
        &self.hook
    }
}

/// Result of one periodic rescan: every configured binding and its state.
#[derive(Debug, Clone, Default)]
pub struct RescanPlan {
    bindings: Vec<(HotkeyBinding, BindingState)>,
}

impl RescanPlan {
    /// Pair every binding in `config` with the liveness of its application.
    #[instrument(skip_all)]
    pub fn build(config: &Config, directory: &SessionDirectory) -> Self {
        let mut live = HashSet::new();
        let mut dead = HashSet::new();

        let bindings = config
            .bindings()
            .map(|binding| {
                let active = if live.contains(&binding.app) {
                    true
                } else if dead.contains(&binding.app) {
                    false
                } else if directory.resolve(&binding.app).is_some() {
                    live.insert(binding.app.clone());
                    true
                } else {
                    dead.insert(binding.app.clone());
                    false
                };

                let state = if active {
                    BindingState::BoundActive
                } else {
                    BindingState::BoundInactive
                };
                (binding, state)
            })
            .collect::<Vec<_>>();

        debug!(bindings = bindings.len(), live_apps = live.len(), "Rescan complete");

        Self { bindings }
    }

    /// Distinct combinations that need a hook, active or not.
    pub fn combinations(&self) -> Vec<KeyCombination> {
        self.bindings
            .iter()
            .map(|(binding, _)| binding.combination.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// State of one (application, action) pair.
    pub fn state(&self, app: &ApplicationIdentity, action: HotkeyAction) -> BindingState {
        self.bindings
            .iter()
            .find(|(binding, _)| &binding.app == app && binding.action == action)
            .map_or(BindingState::Unbound, |(_, state)| *state)
    }

    /// Bindings whose application currently resolves.
    pub fn active(&self) -> impl Iterator<Item = &HotkeyBinding> {
        self.bindings
            .iter()
            .filter(|(_, state)| *state == BindingState::BoundActive)
            .map(|(binding, _)| binding)
    }
}

/// Bindings in `config` that use `combination`.
pub fn bindings_for(config: &Config, combination: &KeyCombination) -> Vec<HotkeyBinding> {
    config
        .bindings()
        .filter(|binding| &binding.combination == combination)
        .collect()
}

/// Run every action bound to `combination`.
///
/// Each binding is isolated: a failing session does not stop the others.
/// Returns how many bindings changed a live session.
#[instrument(skip(controller), fields(combination = %combination))]
pub fn dispatch_hotkey(controller: &VolumeController, combination: &KeyCombination) -> usize {
    let config = controller.store().snapshot();
    let mut applied = 0;

    for binding in bindings_for(&config, combination) {
        match controller.apply(&binding.app, binding.action.command()) {
            Ok(Some(outcome)) => {
                debug!(app = %binding.app, action = %binding.action, ?outcome, "Hotkey applied");
                applied += 1;
            }
            Ok(None) => {
                debug!(app = %binding.app, action = %binding.action, "Hotkey inert, no session");
            }
            Err(e) => {
                warn!(app = %binding.app, action = %binding.action, error = ?e, "Hotkey action failed");
            }
        }
    }

    applied
}
