//! Mixkeys Core Library
//!
//! Per-application volume control: resolves application names to live audio
//! sessions, applies volume and mute commands, keeps global hotkey bindings in
//! step with the sessions that exist, and reconciles OS state back into a
//! UI-facing view. Every OS facility is consumed through a capability trait
//! ([`AudioBackend`], [`HotkeyHook`], [`KeyCapture`], [`Autostart`]).
//!
//! # Example
//!
//! ```no_run
//! use mixkeys_core::{
//!     ApplicationIdentity, AudioBackend, ConfigStore, CoreResult, SessionDirectory,
//!     VolumeCommand, VolumeController,
//! };
//!
//! use std::{path::Path, sync::Arc};
//!
//! fn raise(backend: Arc<dyn AudioBackend>) -> CoreResult<()> {
//!     let store = Arc::new(ConfigStore::open(Path::new("config.toml"))?);
//!     let controller = VolumeController::new(SessionDirectory::new(backend), store);
//!
//!     let app = ApplicationIdentity::new("spotify.exe");
//!     controller.apply(&app, VolumeCommand::Adjust(0.1))?;
//!     Ok(())
//! }
//! ```

mod autostart;
mod config;
mod error;
mod hotkey;
mod identity;
mod reconcile;
mod session;
mod volume;

pub use {
    autostart::{Autostart, set_autostart, sync_autostart},
    config::{AppEntry, Config, ConfigStore, GlobalSettings},
    error::{CoreError, Result as CoreResult},
    hotkey::{
        BindingState, HOTKEY_VOLUME_STEP, HotkeyAction, HotkeyBinding, HotkeyBindingManager,
        HotkeyHook, HotkeyTriple, KeyCapture, KeyCombination, RescanPlan, bindings_for,
        capture_hotkeys, dispatch_hotkey,
    },
    identity::ApplicationIdentity,
    reconcile::{DisplayChange, DisplayedState, MixerView, Observation, Reconciler},
    session::{AudioBackend, AudioSession, SessionDirectory, SessionDiscovery, SessionHandle},
    volume::{
        VolumeCommand, VolumeController, VolumeEngine, VolumeOutcome, percent_to_scalar,
        scalar_to_percent,
    },
};

#[cfg(test)]
mod tests;
