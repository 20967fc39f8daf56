use crate::{
    AppCommand, AppError, AppResult, ChannelCapture, TrayCommand, hotkey_handler::combinations_for_id,
    notifier,
};

use mixkeys_core::{
    ApplicationIdentity, Autostart, ConfigStore, HotkeyAction, VolumeController, capture_hotkeys,
    dispatch_hotkey, set_autostart,
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use error_location::ErrorLocation;
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Main application state.
///
/// Runs on the async runtime thread. Sends tray and hotkey changes back to
/// the main thread through `tray_proxy`, because `TrayIcon` and the hotkey
/// manager must stay on the UI thread.
pub struct App {
    /// `None` when the audio backend is unavailable on this system.
    pub(crate) controller: Option<Arc<VolumeController>>,
    pub(crate) store: Arc<ConfigStore>,
    pub(crate) autostart: Arc<dyn Autostart>,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) tracked_tx: watch::Sender<Vec<ApplicationIdentity>>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) capturing: Arc<AtomicBool>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Mixkeys starting");

        // MenuEvent::receiver() is a crossbeam receiver with a blocking recv(),
        // so one persistent blocking task forwards into tokio. It exits on the
        // first blocking_send() after menu_event_rx is dropped.
        let (menu_event_tx, mut menu_event_rx) = mpsc::channel(32);
        let menu_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if menu_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        if let Err(e) = self.refresh().await {
            error!(error = ?e, "Initial application scan failed");
        }

        loop {
            tokio::select! {
                Some(event) = menu_event_rx.recv() => {
                    match crate::tray_manager::menu_command(&event.id) {
                        Some(AppCommand::Shutdown) => {
                            info!("Exit requested from tray menu");
                            break;
                        }
                        Some(cmd) => self.dispatch(cmd).await,
                        None => debug!(menu_id = ?event.id, "Unhandled menu event"),
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    if matches!(cmd, AppCommand::Shutdown) {
                        info!("Shutdown requested");
                        break;
                    }
                    self.dispatch(cmd).await;
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(menu_event_rx);

        match tokio::time::timeout(Duration::from_secs(1), menu_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        let _ = self.tray_proxy.send_event(TrayCommand::Shutdown);
        info!("Mixkeys shut down successfully");

        Ok(())
    }

    async fn dispatch(&self, cmd: AppCommand) {
        if let Err(e) = self.handle_command(cmd).await {
            error!(error = ?e, "Failed to handle command");
        }
    }

    #[instrument(skip(self))]
    async fn handle_command(&self, cmd: AppCommand) -> AppResult<()> {
        match cmd {
            AppCommand::HotkeyPressed { hotkey_id } => self.hotkey_pressed(hotkey_id),
            AppCommand::Volume { app, command } => {
                let Some(controller) = self.controller.clone() else {
                    return Ok(());
                };
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = controller.apply(&app, command) {
                        warn!(app = %app, error = ?e, "Volume command failed");
                    }
                });
                Ok(())
            }
            AppCommand::Restore { app } => {
                let Some(controller) = self.controller.clone() else {
                    return Ok(());
                };
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = controller.restore_remembered(&app) {
                        warn!(app = %app, error = ?e, "Restoring remembered state failed");
                    }
                });
                Ok(())
            }
            AppCommand::Refresh => self.refresh().await,
            AppCommand::CaptureHotkeys { app } => {
                self.start_capture(app);
                Ok(())
            }
            AppCommand::ToggleRemember => {
                let enabled = !self.store.settings().remember_volumes;
                if let Err(e) = self.store.set_remember_volumes(enabled) {
                    warn!(error = ?e, "Remember setting kept in memory only");
                }
                info!(enabled, "Remember volumes toggled");
                self.publish_settings()
            }
            AppCommand::ToggleAutostart => {
                let enabled = !self.store.settings().auto_start;
                if let Err(e) = set_autostart(self.autostart.as_ref(), &self.store, enabled) {
                    warn!(error = ?e, "Failed to change autostart");
                    notifier::notify("Could not change autostart", &e.to_string());
                }
                self.publish_settings()
            }
            AppCommand::ReloadConfig => {
                if let Err(e) = self.store.reload() {
                    warn!(error = ?e, "Reload failed, keeping current configuration");
                    notifier::notify("Could not reload config", &e.to_string());
                    return Ok(());
                }
                self.publish_settings()?;
                self.refresh().await
            }
            AppCommand::OpenConfig => {
                let path = self.store.path().to_path_buf();
                if !path.exists()
                    && let Err(e) = self.store.flush()
                {
                    warn!(error = ?e, "Could not create config file");
                }
                if let Err(e) = open::that(&path) {
                    warn!(config_path = ?path, error = ?e, "Failed to open config file");
                }
                Ok(())
            }
            AppCommand::Shutdown => Ok(()),
        }
    }

    fn hotkey_pressed(&self, hotkey_id: u32) -> AppResult<()> {
        let Some(controller) = self.controller.clone() else {
            return Ok(());
        };

        let combinations = combinations_for_id(&self.store.snapshot(), hotkey_id);
        if combinations.is_empty() {
            debug!(hotkey_id, "No binding for this hotkey any more");
            return Ok(());
        }

        tokio::task::spawn_blocking(move || {
            for combination in &combinations {
                let applied = dispatch_hotkey(&controller, combination);
                debug!(combination = %combination, applied, "Hotkey dispatched");
            }
        });

        Ok(())
    }

    /// Rebuild the tracked set from live sessions.
    ///
    /// Applications not tracked before get their remembered state re-applied.
    #[instrument(skip(self))]
    async fn refresh(&self) -> AppResult<()> {
        let apps = match self.controller.clone() {
            Some(controller) => {
                let previous = self.tracked_tx.borrow().clone();
                tokio::task::spawn_blocking(move || {
                    let apps = controller.directory().list_active_applications();
                    for app in apps.iter().filter(|app| !previous.contains(app)) {
                        if let Err(e) = controller.restore_remembered(app) {
                            warn!(app = %app, error = ?e, "Restoring remembered state failed");
                        }
                    }
                    apps
                })
                .await
                .map_err(|e| AppError::TaskFailed {
                    reason: format!("Application scan failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?
            }
            None => Vec::new(),
        };

        info!(apps = apps.len(), "Tracked applications refreshed");

        self.tracked_tx.send_replace(apps.clone());
        self.send_tray(TrayCommand::Track {
            apps,
            config: Box::new(self.store.snapshot()),
        })
    }

    fn start_capture(&self, app: ApplicationIdentity) {
        if self.capturing.swap(true, Ordering::AcqRel) {
            warn!(app = %app, "Hotkey capture already in progress");
            return;
        }

        let tray_proxy = self.tray_proxy.clone();
        let store = Arc::clone(&self.store);
        let capturing = Arc::clone(&self.capturing);
        let command_tx = self.command_tx.clone();

        tokio::task::spawn_blocking(move || {
            let mut capture = ChannelCapture::new(tray_proxy.clone());
            let capture_id = capture.capture_id();
            info!(capture_id = %capture_id, app = %app, "Hotkey capture started");

            let result = capture_hotkeys(&mut capture, &app, &store);

            let _ = tray_proxy.send_event(TrayCommand::EndCapture);
            capturing.store(false, Ordering::Release);

            match result {
                Ok(triple) => {
                    let combinations = HotkeyAction::ALL
                        .into_iter()
                        .map(|action| triple.get(action).clone())
                        .collect();
                    let _ = tray_proxy.send_event(TrayCommand::InstallHotkeys(combinations));

                    let label = store
                        .entry(&app)
                        .and_then(|entry| entry.hotkey_label())
                        .unwrap_or_default();
                    info!(capture_id = %capture_id, app = %app, "Hotkey capture complete");
                    notifier::notify(&format!("Hotkeys saved for {app}"), &label);
                }
                Err(e) => {
                    warn!(capture_id = %capture_id, app = %app, error = ?e, "Hotkey capture failed");
                    notifier::notify("Hotkey capture cancelled", &e.to_string());
                }
            }

            if command_tx.blocking_send(AppCommand::Refresh).is_err() {
                debug!("Command channel closed before refresh after capture");
            }
        });
    }

    fn publish_settings(&self) -> AppResult<()> {
        self.send_tray(TrayCommand::Settings(self.store.settings()))
    }

    #[track_caller]
    fn send_tray(&self, cmd: TrayCommand) -> AppResult<()> {
        self.tray_proxy
            .send_event(cmd)
            .map_err(|_| AppError::ChannelSendFailed {
                message: "UI event loop closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
