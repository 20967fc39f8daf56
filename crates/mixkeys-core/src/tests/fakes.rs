//! In-memory stand-ins for the OS capabilities.

use crate::{
    Autostart, AudioBackend, AudioSession, ApplicationIdentity, CoreError, CoreResult,
    HotkeyAction, HotkeyHook, KeyCapture, KeyCombination, SessionHandle,
};

use std::{
    collections::VecDeque,
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use error_location::ErrorLocation;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct FakeSessionState {
    name: String,
    volume: f32,
    muted: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    sessions: Vec<FakeSessionState>,
    fail_queries: bool,
    writes: usize,
}

/// Audio backend whose sessions live in a shared vector.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_sessions(sessions: &[(&str, f32, bool)]) -> Self {
        let backend = Self::new();
        for &(name, volume, muted) in sessions {
            backend.add(name, volume, muted);
        }
        backend
    }

    pub(crate) fn add(&self, name: &str, volume: f32, muted: bool) {
        self.lock().sessions.push(FakeSessionState {
            name: name.to_string(),
            volume,
            muted,
        });
    }

    pub(crate) fn remove(&self, name: &str) {
        self.lock().sessions.retain(|s| s.name != name);
    }

    /// Change a session's volume behind the engine's back, like another mixer would.
    pub(crate) fn set_external_volume(&self, name: &str, volume: f32) {
        if let Some(s) = self.lock().sessions.iter_mut().find(|s| s.name == name) {
            s.volume = volume;
        }
    }

    pub(crate) fn set_external_mute(&self, name: &str, muted: bool) {
        if let Some(s) = self.lock().sessions.iter_mut().find(|s| s.name == name) {
            s.muted = muted;
        }
    }

    pub(crate) fn volume(&self, name: &str) -> Option<f32> {
        self.lock()
            .sessions
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.volume)
    }

    pub(crate) fn muted(&self, name: &str) -> Option<bool> {
        self.lock()
            .sessions
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.muted)
    }

    /// Number of set_volume / set_muted calls that reached a session.
    pub(crate) fn writes(&self) -> usize {
        self.lock().writes
    }

    pub(crate) fn fail_queries(&self, fail: bool) {
        self.lock().fail_queries = fail;
    }

    pub(crate) fn into_backend(self) -> Arc<dyn AudioBackend> {
        Arc::new(self)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AudioBackend for FakeBackend {
    #[track_caller]
    fn sessions(&self) -> CoreResult<Vec<SessionHandle>> {
        let state = self.lock();
        if state.fail_queries {
            return Err(CoreError::SessionQueryFailed {
                reason: "fake outage".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(state
            .sessions
            .iter()
            .enumerate()
            .map(|(index, s)| {
                Box::new(FakeSession {
                    state: Arc::clone(&self.state),
                    index,
                    name: s.name.clone(),
                }) as SessionHandle
            })
            .collect())
    }
}

struct FakeSession {
    state: Arc<Mutex<FakeState>>,
    index: usize,
    name: String,
}

impl FakeSession {
    #[track_caller]
    fn with<T>(&self, f: impl FnOnce(&mut FakeState, usize) -> T) -> CoreResult<T> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let alive = state
            .sessions
            .get(self.index)
            .is_some_and(|s| s.name == self.name);

        if !alive {
            return Err(CoreError::SessionOperationFailed {
                app: self.name.clone(),
                reason: "session expired".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(f(&mut state, self.index))
    }
}

impl AudioSession for FakeSession {
    fn process_name(&self) -> &str {
        &self.name
    }

    fn volume(&self) -> CoreResult<f32> {
        self.with(|state, i| state.sessions[i].volume)
    }

    fn set_volume(&self, level: f32) -> CoreResult<()> {
        self.with(|state, i| {
            state.sessions[i].volume = level;
            state.writes += 1;
        })
    }

    fn is_muted(&self) -> CoreResult<bool> {
        self.with(|state, i| state.sessions[i].muted)
    }

    fn set_muted(&self, muted: bool) -> CoreResult<()> {
        self.with(|state, i| {
            state.sessions[i].muted = muted;
            state.writes += 1;
        })
    }
}

/// Hook that records registrations and can be told to refuse one combination.
///
/// The refusal is one-shot unless `keep_refusing` is set.
#[derive(Debug, Default)]
pub(crate) struct RecordingHook {
    pub(crate) registered: Vec<KeyCombination>,
    pub(crate) attempts: usize,
    pub(crate) refuse: Option<KeyCombination>,
    pub(crate) keep_refusing: bool,
}

impl HotkeyHook for RecordingHook {
    #[track_caller]
    fn register(&mut self, combination: &KeyCombination) -> CoreResult<()> {
        self.attempts += 1;
        if self.refuse.as_ref() == Some(combination) {
            if !self.keep_refusing {
                self.refuse = None;
            }
            return Err(CoreError::HotkeyRegistrationFailed {
                combination: combination.to_string(),
                reason: "already taken by another program".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.registered.push(combination.clone());
        Ok(())
    }
}

/// Capture source that replays a fixed list of combinations.
#[derive(Debug, Default)]
pub(crate) struct ScriptedCapture {
    pub(crate) script: VecDeque<KeyCombination>,
    pub(crate) prompts: Vec<(ApplicationIdentity, HotkeyAction)>,
}

impl ScriptedCapture {
    pub(crate) fn new(keys: &[&str]) -> Self {
        Self {
            script: keys
                .iter()
                .filter_map(|k| KeyCombination::parse(k).ok())
                .collect(),
            prompts: Vec::new(),
        }
    }
}

impl KeyCapture for ScriptedCapture {
    #[track_caller]
    fn capture_next(
        &mut self,
        app: &ApplicationIdentity,
        action: HotkeyAction,
    ) -> CoreResult<KeyCombination> {
        self.prompts.push((app.clone(), action));
        self.script.pop_front().ok_or_else(|| CoreError::CaptureFailed {
            reason: "capture cancelled".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Autostart capability backed by a flag.
#[derive(Debug, Default)]
pub(crate) struct FakeAutostart {
    pub(crate) enabled: Mutex<bool>,
    pub(crate) broken: bool,
}

impl Autostart for FakeAutostart {
    #[track_caller]
    fn enable(&self) -> CoreResult<()> {
        if self.broken {
            return Err(unavailable());
        }
        *self.enabled.lock().unwrap_or_else(|e| e.into_inner()) = true;
        Ok(())
    }

    #[track_caller]
    fn disable(&self) -> CoreResult<()> {
        if self.broken {
            return Err(unavailable());
        }
        *self.enabled.lock().unwrap_or_else(|e| e.into_inner()) = false;
        Ok(())
    }

    #[track_caller]
    fn is_enabled(&self) -> CoreResult<bool> {
        if self.broken {
            return Err(unavailable());
        }
        Ok(*self.enabled.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

#[track_caller]
fn unavailable() -> CoreError {
    CoreError::CapabilityUnavailable {
        capability: "autostart",
        reason: "registry locked".to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// A config path inside a fresh, not yet existing, temp directory.
pub(crate) fn temp_config_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("mixkeys-test-{}", Uuid::new_v4()))
        .join("config.toml")
}

#[allow(clippy::panic)]
pub(crate) fn combo(raw: &str) -> KeyCombination {
    match KeyCombination::parse(raw) {
        Ok(c) => c,
        Err(e) => panic!("bad test combination {raw:?}: {e}"),
    }
}
