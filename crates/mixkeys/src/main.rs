//! Mixkeys: per-application volume control from global hotkeys and the tray.

mod app;
mod app_command;
mod chord_recorder;
mod config;
mod error;
mod hotkey_handler;
mod hotkey_registry;
mod key_capture;
mod notifier;
mod platform;
mod tray_command;
mod tray_icon_state;
mod tray_manager;
mod workers;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    chord_recorder::ChordRecorder,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    hotkey_registry::GlobalHotkeyHook,
    key_capture::ChannelCapture,
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::TrayManager,
};

use mixkeys_core::{
    ConfigStore, HotkeyBindingManager, KeyCombination, MixerView, Reconciler, SessionDirectory,
    VolumeController, sync_autostart,
};

use std::{
    cell::Cell,
    rc::Rc,
    sync::{Arc, atomic::AtomicBool},
};

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::{DeviceEvent, Event, StartCause},
    event_loop::{ControlFlow, DeviceEventFilter, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "mixkeys=debug,mixkeys_core=debug";

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    // Capture records raw key events even though the app has no focused window.
    event_loop.set_device_event_filter(DeviceEventFilter::Never);
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    let mut view = MixerView::new();
    let dirty = Rc::new(Cell::new(false));
    view.subscribe({
        let dirty = Rc::clone(&dirty);
        move |change| {
            debug!(?change, "Display changed");
            dirty.set(true);
        }
    });

    // Persists across event loop iterations - dropping it unregisters every hook.
    let mut hotkeys: Option<HotkeyBindingManager<GlobalHotkeyHook>> = None;
    let mut recorder = ChordRecorder::new();
    let mut pending_capture: Option<std::sync::mpsc::Sender<KeyCombination>> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => match cmd {
                TrayCommand::Track { apps, config } => {
                    view.track(apps);
                    view.set_hotkey_labels(&config);
                    dirty.set(true);
                }
                TrayCommand::Observed(observations) => {
                    view.apply(&observations);
                }
                TrayCommand::InstallHotkeys(combinations) => {
                    if let Some(manager) = hotkeys.as_mut() {
                        let added = manager.install(&combinations);
                        if added > 0 {
                            info!(added, installed = manager.installed_count(), "Hotkey hooks installed");
                        }
                    }
                }
                TrayCommand::BeginCapture { app, action, reply } => {
                    // Replacing an older sender cancels that capture step.
                    pending_capture = Some(reply);

                    let prompt = format!("Press the {action} hotkey for {app}");
                    if let Err(e) = tray_manager.update_state(TrayIconState::Capturing, Some(&prompt)) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                    notifier::notify("Set hotkeys", &prompt);
                }
                TrayCommand::EndCapture => {
                    pending_capture = None;
                    if let Err(e) = tray_manager.update_state(TrayIconState::Idle, None) {
                        error!(error = ?e, "Failed to update tray icon");
                    }
                }
                TrayCommand::Settings(settings) => {
                    tray_manager.set_settings(settings);
                    dirty.set(true);
                }
                TrayCommand::Shutdown => {
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::DeviceEvent {
                event: DeviceEvent::Key(raw),
                ..
            } => {
                if let Some(chord) = recorder.record(raw.physical_key, raw.state)
                    && let Some(reply) = pending_capture.take()
                    && reply.send(chord).is_err()
                {
                    debug!("Capture step was abandoned before a key was pressed");
                }
            }
            Event::NewEvents(StartCause::Init) => {
                let config_path = match config::config_path() {
                    Ok(p) => p,
                    Err(e) => {
                        error!("Failed to resolve config path: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let store = match ConfigStore::open(&config_path) {
                    Ok(store) => Arc::new(store.with_failure_reporter(|e| {
                        notifier::notify("Mixkeys could not save its settings", &e.to_string());
                    })),
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let autostart = platform::autostart();
                sync_autostart(autostart.as_ref(), &store);
                tray_manager.set_settings(store.settings());

                let controller = match platform::audio_backend() {
                    Ok(backend) => Some(Arc::new(VolumeController::new(
                        SessionDirectory::new(backend),
                        Arc::clone(&store),
                    ))),
                    Err(e) => {
                        warn!(error = ?e, "Audio sessions unavailable, volume features disabled");
                        notifier::notify("Mixkeys", "Audio sessions are unavailable on this system");
                        tray_manager.set_audio_available(false);
                        None
                    }
                };

                // Register hotkeys on the main thread - tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                match GlobalHotKeyManager::new() {
                    Ok(manager) => {
                        hotkeys = Some(HotkeyBindingManager::new(GlobalHotkeyHook::new(manager)));
                    }
                    Err(e) => {
                        warn!(error = ?e, "Global hotkeys unavailable");
                    }
                }

                dirty.set(true);

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let (tracked_tx, tracked_rx) = watch::channel(Vec::new());

                let tray_proxy = tray_proxy.clone();

                // Spawn tokio runtime on separate thread.
                // TrayManager, MixerView and the hotkey manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let hotkey_handler = HotkeyHandler::new(command_tx.clone());

                        let reconciler = controller
                            .as_ref()
                            .map(|c| Reconciler::new(c.directory().clone()));
                        let rescan_controller = controller.clone();

                        let reconcile_proxy = tray_proxy.clone();
                        let reconcile_shutdown = shutdown_rx.clone();
                        let rescan_proxy = tray_proxy.clone();
                        let rescan_shutdown = shutdown_rx.clone();

                        let app = App {
                            controller,
                            store,
                            autostart,
                            tray_proxy,
                            command_tx,
                            command_rx,
                            tracked_tx,
                            shutdown_tx,
                            capturing: Arc::new(AtomicBool::new(false)),
                        };

                        tokio::join!(
                            hotkey_handler.run(shutdown_rx),
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            },
                            async move {
                                if let Some(reconciler) = reconciler {
                                    workers::run_reconciliation(
                                        reconciler,
                                        tracked_rx,
                                        reconcile_proxy,
                                        reconcile_shutdown,
                                    )
                                    .await;
                                }
                            },
                            async move {
                                if let Some(controller) = rescan_controller {
                                    workers::run_rescan(controller, rescan_proxy, rescan_shutdown)
                                        .await;
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        if dirty.take()
            && let Err(e) = tray_manager.render(&view)
        {
            error!(error = ?e, "Failed to rebuild tray menu");
        }
    });
}
