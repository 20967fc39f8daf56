use crate::{
    ApplicationIdentity, Config, ConfigStore, CoreError, GlobalSettings, HotkeyTriple,
    VolumeOutcome,
    tests::fakes::{combo, temp_config_path},
};

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// WHAT: A missing config file yields the documented defaults
/// WHY: First run must work without any file on disk
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_file_when_opening_store_then_defaults_used() {
    // Given: A path that does not exist
    let path = temp_config_path();

    // When: Opening the store
    let store = ConfigStore::open(&path).unwrap();

    // Then: remember_volumes on, auto_start off, no apps
    let config = store.snapshot();
    assert!(config.settings.remember_volumes);
    assert!(!config.settings.auto_start);
    assert!(config.apps.is_empty());
    assert!(!path.exists());
}

/// WHAT: Setting hotkeys on a fresh store persists exactly that triple
/// WHY: The document must contain the binding and nothing else must change
#[test]
#[allow(clippy::unwrap_used)]
fn given_fresh_store_when_setting_hotkeys_then_document_contains_only_that_triple() {
    // Given: A fresh store
    let path = temp_config_path();
    let store = ConfigStore::open(&path).unwrap();
    let app = ApplicationIdentity::new("app.exe");

    // When: Setting ctrl+up / ctrl+down / ctrl+m
    store
        .set_hotkeys(
            &app,
            HotkeyTriple {
                vol_up: combo("ctrl+up"),
                vol_down: combo("ctrl+down"),
                mute: combo("ctrl+m"),
            },
        )
        .unwrap();

    // Then: The file holds exactly those three keys under apps."app.exe"
    let raw = std::fs::read_to_string(&path).unwrap();
    let doc: toml::Table = toml::from_str(&raw).unwrap();

    let apps = doc["apps"].as_table().unwrap();
    assert_eq!(apps.len(), 1);
    let entry = apps["app.exe"].as_table().unwrap();
    assert_eq!(entry.len(), 3);
    assert_eq!(entry["vol_up"].as_str(), Some("ctrl+up"));
    assert_eq!(entry["vol_down"].as_str(), Some("ctrl+down"));
    assert_eq!(entry["mute"].as_str(), Some("ctrl+m"));

    let settings = doc["settings"].as_table().unwrap();
    assert_eq!(settings["remember_volumes"].as_bool(), Some(true));
    assert_eq!(settings["auto_start"].as_bool(), Some(false));
}

/// WHAT: Save then load reproduces the in-memory document
/// WHY: Nested hotkey triples and remembered levels must survive a restart
#[test]
#[allow(clippy::unwrap_used)]
fn given_populated_config_when_saved_and_loaded_then_identical() {
    // Given: A config with two apps, one fully populated, one partial
    let path = temp_config_path();
    let mut config = Config {
        settings: GlobalSettings {
            remember_volumes: false,
            auto_start: true,
        },
        ..Config::default()
    };
    let spotify = config
        .apps
        .entry(ApplicationIdentity::new("Spotify.exe"))
        .or_default();
    spotify.set_hotkeys(HotkeyTriple {
        vol_up: combo("ctrl+alt+up"),
        vol_down: combo("ctrl+alt+down"),
        mute: combo("ctrl+alt+m"),
    });
    spotify.volume = Some(35);
    spotify.muted = Some(true);
    config
        .apps
        .entry(ApplicationIdentity::new("discord.exe"))
        .or_default()
        .volume = Some(80);

    // When: Saving and loading
    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    // Then: Structures match, including original key spelling
    assert_eq!(loaded, config);
    let names: Vec<&str> = loaded.apps.keys().map(ApplicationIdentity::as_str).collect();
    assert!(names.contains(&"Spotify.exe"));
}

/// WHAT: Hand-written combinations are normalized on load
/// WHY: "Ctrl + Up" and "ctrl+up" must register one hook, not two
#[test]
#[allow(clippy::unwrap_used)]
fn given_mixed_case_document_when_loading_then_combinations_normalized() {
    // Given: A document written by hand
    let path = temp_config_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        "[apps.\"VLC.exe\"]\nvol_up = \"Ctrl + Up\"\nvolume = 50\n\n[settings]\nremember_volumes = true\n",
    )
    .unwrap();

    // When: Loading
    let config = Config::load_from(&path).unwrap();

    // Then: Combination normalized, missing settings defaulted, lookup ignores case
    let entry = &config.apps[&ApplicationIdentity::new("vlc.exe")];
    assert_eq!(entry.vol_up, Some(combo("ctrl+up")));
    assert_eq!(entry.vol_down, None);
    assert_eq!(entry.volume, Some(50));
    assert!(!config.settings.auto_start);
}

/// WHAT: A corrupt document is rejected with ConfigParseFailed
/// WHY: Silently replacing it with defaults would lose the user's bindings
#[test]
#[allow(clippy::unwrap_used)]
fn given_corrupt_document_when_loading_then_parse_error() {
    // Given: A file that is not TOML
    let path = temp_config_path();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "apps = [[[").unwrap();

    // When: Loading
    let result = Config::load_from(&path);

    // Then: Parse error
    assert!(matches!(result, Err(CoreError::ConfigParseFailed { .. })));
}

/// WHAT: Volume results are not written while remembering is disabled
/// WHY: The remember toggle must gate every write-back
#[test]
#[allow(clippy::unwrap_used)]
fn given_remember_disabled_when_remembering_then_nothing_written() {
    // Given: A store with remember_volumes off
    let path = temp_config_path();
    let store = ConfigStore::open(&path).unwrap();
    store.set_remember_volumes(false).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    // When: Remembering a volume
    let written = store
        .remember(&ApplicationIdentity::new("app.exe"), VolumeOutcome::Volume(40))
        .unwrap();

    // Then: Nothing recorded
    assert!(!written);
    assert!(store.entry(&ApplicationIdentity::new("app.exe")).is_none());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

/// WHAT: Remembered values land in the file immediately
/// WHY: Losing the last action on a crash is not acceptable
#[test]
#[allow(clippy::unwrap_used)]
fn given_remember_enabled_when_remembering_then_flushed_to_disk() {
    // Given: A fresh store
    let path = temp_config_path();
    let store = ConfigStore::open(&path).unwrap();
    let app = ApplicationIdentity::new("game.exe");

    // When: Remembering a volume and a mute flag
    store.remember(&app, VolumeOutcome::Volume(42)).unwrap();
    store.remember(&app, VolumeOutcome::Muted(true)).unwrap();

    // Then: A fresh load sees both
    let on_disk = Config::load_from(&path).unwrap();
    let entry = &on_disk.apps[&app];
    assert_eq!(entry.volume, Some(42));
    assert_eq!(entry.muted, Some(true));
}

/// WHAT: Failed writes keep the in-memory state and are reported once per streak
/// WHY: Users get one notification, and nothing is lost before the disk recovers
#[test]
#[allow(clippy::unwrap_used)]
fn given_unwritable_path_when_mutating_then_memory_kept_and_failure_reported_once() {
    // Given: A config path whose parent is a regular file
    let blocker = temp_config_path();
    std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
    std::fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("config.toml");

    let reports = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reports);
    let store = ConfigStore::open(&path)
        .unwrap()
        .with_failure_reporter(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    // When: Two mutations fail to persist
    let first = store.set_auto_start(true);
    let second = store.set_remember_volumes(false);

    // Then: Both fail, both are kept in memory, one report
    assert!(matches!(first, Err(CoreError::PersistenceFailed { .. })));
    assert!(matches!(second, Err(CoreError::PersistenceFailed { .. })));
    let settings = store.settings();
    assert!(settings.auto_start);
    assert!(!settings.remember_volumes);
    assert_eq!(reports.load(Ordering::SeqCst), 1);
}

/// WHAT: Reload picks up edits made outside the app
/// WHY: Users may edit bindings by hand and reload from the tray
#[test]
#[allow(clippy::unwrap_used)]
fn given_file_edited_externally_when_reloading_then_store_reflects_edit() {
    // Given: A store and an external edit
    let path = temp_config_path();
    let store = ConfigStore::open(&path).unwrap();
    store.set_auto_start(false).unwrap();
    std::fs::write(&path, "[apps.\"obs64.exe\"]\nmute = \"f9\"\n").unwrap();

    // When: Reloading
    store.reload().unwrap();

    // Then: The edit is visible
    let entry = store.entry(&ApplicationIdentity::new("OBS64.EXE")).unwrap();
    assert_eq!(entry.mute, Some(combo("f9")));
    assert_eq!(entry.hotkey_label().as_deref(), Some("MUTE: f9"));
}
