use crate::{
    ApplicationIdentity, BindingState, ConfigStore, CoreError, HotkeyAction, HotkeyBindingManager,
    HotkeyTriple, KeyCombination, RescanPlan, SessionDirectory, VolumeController, bindings_for,
    capture_hotkeys, dispatch_hotkey,
    tests::fakes::{FakeBackend, RecordingHook, ScriptedCapture, combo, temp_config_path},
};

use std::sync::Arc;

fn triple(up: &str, down: &str, mute: &str) -> HotkeyTriple {
    HotkeyTriple {
        vol_up: combo(up),
        vol_down: combo(down),
        mute: combo(mute),
    }
}

#[allow(clippy::unwrap_used)]
fn store_with(bindings: &[(&str, HotkeyTriple)]) -> Arc<ConfigStore> {
    let store = ConfigStore::open(&temp_config_path()).unwrap();
    for (app, t) in bindings {
        store.set_hotkeys(&ApplicationIdentity::new(*app), t.clone()).unwrap();
    }
    Arc::new(store)
}

/// WHAT: Combinations are normalized and malformed ones rejected
/// WHY: Equal chords must share one hook; empty segments cannot be registered
#[test]
#[allow(clippy::unwrap_used)]
fn given_raw_strings_when_parsing_combinations_then_normalized_or_rejected() {
    assert_eq!(KeyCombination::parse(" Ctrl + Shift+UP ").unwrap().as_str(), "ctrl+shift+up");
    assert_eq!(
        KeyCombination::parse("ctrl+m").unwrap(),
        KeyCombination::parse("CTRL+M").unwrap()
    );
    assert!(matches!(
        KeyCombination::parse("ctrl++"),
        Err(CoreError::InvalidKeyCombination { .. })
    ));
    assert!(KeyCombination::parse("").is_err());
}

/// WHAT: Installing the same combinations repeatedly registers each once
/// WHY: The rescan loop calls install every period
#[test]
fn given_installed_hooks_when_installing_again_then_no_duplicate_registration() {
    // Given: A manager with two hooks installed
    let mut manager = HotkeyBindingManager::new(RecordingHook::default());
    let combos = vec![combo("ctrl+up"), combo("ctrl+down")];
    assert_eq!(manager.install(&combos), 2);

    // When: Installing the same set twice more
    let again = manager.install(&combos) + manager.install(&combos);

    // Then: Nothing new registered
    assert_eq!(again, 0);
    assert_eq!(manager.hook().registered.len(), 2);
    assert_eq!(manager.installed_count(), 2);
}

/// WHAT: A refused registration is retried on the next install
/// WHY: Another program may release the chord later
#[test]
fn given_refused_registration_when_installing_again_then_retried() {
    // Given: A hook refusing ctrl+m once
    let hook = RecordingHook {
        refuse: Some(combo("ctrl+m")),
        ..RecordingHook::default()
    };
    let mut manager = HotkeyBindingManager::new(hook);

    // When: Installing twice
    let first = manager.install(&[combo("ctrl+m")]);
    let refused_after_first = manager.is_refused(&combo("ctrl+m"));
    let second = manager.install(&[combo("ctrl+m")]);

    // Then: Installed on the second attempt and no longer marked refused
    assert_eq!(first, 0);
    assert!(refused_after_first);
    assert_eq!(second, 1);
    assert!(manager.is_installed(&combo("ctrl+m")));
    assert!(!manager.is_refused(&combo("ctrl+m")));
}

/// WHAT: A combination the OS keeps refusing stays marked refused and is still attempted each install
/// WHY: Rescans call install every few seconds; the refusal is remembered instead of re-reported
#[test]
fn given_persistently_refused_combination_when_installing_repeatedly_then_remembered_and_retried() {
    // Given: A hook that always refuses ctrl+m
    let hook = RecordingHook {
        refuse: Some(combo("ctrl+m")),
        keep_refusing: true,
        ..RecordingHook::default()
    };
    let mut manager = HotkeyBindingManager::new(hook);

    // When: Installing three times alongside an accepted combination
    let added: usize = (0..3)
        .map(|_| manager.install(&[combo("ctrl+m"), combo("ctrl+up")]))
        .sum();

    // Then: Only ctrl+up installed, ctrl+m refused and attempted every time
    assert_eq!(added, 1);
    assert!(manager.is_refused(&combo("ctrl+m")));
    assert!(!manager.is_installed(&combo("ctrl+m")));
    assert!(manager.is_installed(&combo("ctrl+up")));
    assert_eq!(manager.hook().attempts, 4);
}

/// WHAT: A binding without a live session installs its hook but does nothing when pressed
/// WHY: Hooks stay registered while the application is absent
#[test]
#[allow(clippy::unwrap_used)]
fn given_binding_without_session_when_triggered_then_inert_and_no_error() {
    // Given: Bindings for X and no session named X
    let backend = FakeBackend::with_sessions(&[("other.exe", 0.5, false)]);
    let store = store_with(&[("X", triple("ctrl+up", "ctrl+down", "ctrl+m"))]);
    let directory = SessionDirectory::new(backend.clone().into_backend());
    let controller = VolumeController::new(directory.clone(), Arc::clone(&store));
    let mut manager = HotkeyBindingManager::new(RecordingHook::default());

    // When: Rescanning and installing
    let plan = RescanPlan::build(&store.snapshot(), &directory);
    manager.install(&plan.combinations());

    // Then: Bound-inactive, hook installed
    let x = ApplicationIdentity::new("X");
    assert_eq!(plan.state(&x, HotkeyAction::VolumeUp), BindingState::BoundInactive);
    assert!(manager.is_installed(&combo("ctrl+up")));

    // When: Pressing it
    let applied = dispatch_hotkey(&controller, &combo("ctrl+up"));

    // Then: Nothing happened anywhere
    assert_eq!(applied, 0);
    assert_eq!(backend.writes(), 0);
    assert!(store.entry(&x).unwrap().volume.is_none());
}

/// WHAT: Bindings become active when their session appears
/// WHY: Bound-Inactive and Bound-Active switch automatically with sessions
#[test]
#[allow(clippy::unwrap_used)]
fn given_session_appears_when_rescanning_then_binding_active_and_dispatch_applies() {
    // Given: Bindings for vlc.exe, no session yet
    let backend = FakeBackend::new();
    let store = store_with(&[("vlc.exe", triple("f1", "f2", "f3"))]);
    let directory = SessionDirectory::new(backend.clone().into_backend());
    let controller = VolumeController::new(directory.clone(), Arc::clone(&store));
    let vlc = ApplicationIdentity::new("vlc.exe");
    let before = RescanPlan::build(&store.snapshot(), &directory);
    assert_eq!(before.state(&vlc, HotkeyAction::ToggleMute), BindingState::BoundInactive);

    // When: The session appears and the next rescan runs
    backend.add("VLC.exe", 0.5, false);
    let after = RescanPlan::build(&store.snapshot(), &directory);

    // Then: Active, and pressing the hotkeys acts on the session
    assert_eq!(after.state(&vlc, HotkeyAction::ToggleMute), BindingState::BoundActive);
    assert_eq!(after.active().count(), 3);
    assert_eq!(dispatch_hotkey(&controller, &combo("f3")), 1);
    assert_eq!(backend.muted("VLC.exe"), Some(true));
    assert_eq!(dispatch_hotkey(&controller, &combo("f1")), 1);
    assert!((backend.volume("VLC.exe").unwrap() - 0.6).abs() < 1e-6);
}

/// WHAT: Actions with no configured combination report Unbound
/// WHY: The state machine starts at Unbound
#[test]
fn given_no_binding_when_querying_state_then_unbound() {
    // Given: Empty config
    let store = store_with(&[]);
    let directory = SessionDirectory::new(FakeBackend::new().into_backend());

    // When: Planning
    let plan = RescanPlan::build(&store.snapshot(), &directory);

    // Then: Unbound and nothing to install
    assert_eq!(
        plan.state(&ApplicationIdentity::new("x.exe"), HotkeyAction::VolumeUp),
        BindingState::Unbound
    );
    assert!(plan.combinations().is_empty());
}

/// WHAT: A chord shared by two applications drives both
/// WHY: One hook is registered per chord, so dispatch must fan out
#[test]
fn given_shared_combination_when_dispatching_then_every_bound_app_acts() {
    // Given: Two apps muting on the same chord
    let backend = FakeBackend::with_sessions(&[("a.exe", 0.5, false), ("b.exe", 0.5, false)]);
    let store = store_with(&[
        ("a.exe", triple("f1", "f2", "ctrl+m")),
        ("b.exe", triple("f5", "f6", "ctrl+m")),
    ]);
    let directory = SessionDirectory::new(backend.clone().into_backend());
    let controller = VolumeController::new(directory.clone(), Arc::clone(&store));

    // When: Planning and dispatching the shared chord
    let plan = RescanPlan::build(&store.snapshot(), &directory);
    let applied = dispatch_hotkey(&controller, &combo("ctrl+m"));

    // Then: One combination entry, two mutes
    assert_eq!(plan.combinations().len(), 5);
    assert_eq!(bindings_for(&store.snapshot(), &combo("ctrl+m")).len(), 2);
    assert_eq!(applied, 2);
    assert_eq!(backend.muted("a.exe"), Some(true));
    assert_eq!(backend.muted("b.exe"), Some(true));
}

/// WHAT: Capture asks for up, down, mute in order and stores the triple
/// WHY: The binding flow replaces the application's triple atomically
#[test]
#[allow(clippy::unwrap_used)]
fn given_three_presses_when_capturing_then_triple_stored_in_order() {
    // Given: A previous binding and a scripted user
    let store = store_with(&[("app.exe", triple("f1", "f2", "f3"))]);
    let app = ApplicationIdentity::new("app.exe");
    let mut capture = ScriptedCapture::new(&["ctrl+up", "ctrl+down", "ctrl+m"]);

    // When: Capturing
    let captured = capture_hotkeys(&mut capture, &app, &store).unwrap();

    // Then: Prompts in order and the old triple replaced
    let actions: Vec<HotkeyAction> = capture.prompts.iter().map(|(_, a)| *a).collect();
    assert_eq!(actions, HotkeyAction::ALL.to_vec());
    assert_eq!(captured, triple("ctrl+up", "ctrl+down", "ctrl+m"));
    let entry = store.entry(&app).unwrap();
    assert_eq!(entry.binding(HotkeyAction::ToggleMute), Some(&combo("ctrl+m")));
    assert!(bindings_for(&store.snapshot(), &combo("f1")).is_empty());
}

/// WHAT: An aborted capture leaves the previous triple untouched
/// WHY: Partial triples must never be persisted
#[test]
#[allow(clippy::unwrap_used)]
fn given_capture_cancelled_midway_when_capturing_then_previous_triple_kept() {
    // Given: A previous binding and a user who stops after one key
    let store = store_with(&[("app.exe", triple("f1", "f2", "f3"))]);
    let app = ApplicationIdentity::new("app.exe");
    let mut capture = ScriptedCapture::new(&["ctrl+up"]);

    // When: Capturing
    let result = capture_hotkeys(&mut capture, &app, &store);

    // Then: Error, old triple intact
    assert!(matches!(result, Err(CoreError::CaptureFailed { .. })));
    let entry = store.entry(&app).unwrap();
    assert_eq!(entry.vol_up, Some(combo("f1")));
    assert_eq!(entry.mute, Some(combo("f3")));
}

/// WHAT: Setting hotkeys keeps remembered levels of the same app
/// WHY: Only the triple is replaced, nothing else in the entry
#[test]
#[allow(clippy::unwrap_used)]
fn given_remembered_volume_when_setting_hotkeys_then_volume_kept() {
    // Given: A remembered volume
    let store = store_with(&[]);
    let app = ApplicationIdentity::new("app.exe");
    store.remember(&app, crate::VolumeOutcome::Volume(70)).unwrap();

    // When: Setting hotkeys
    store.set_hotkeys(&app, triple("f1", "f2", "f3")).unwrap();

    // Then: Volume survives
    let entry = store.entry(&app).unwrap();
    assert_eq!(entry.volume, Some(70));
    assert_eq!(entry.vol_down, Some(combo("f2")));
}
