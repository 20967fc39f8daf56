//! Global hotkey event forwarding and id matching.
//!
//! The OS reports a pressed hotkey by numeric id only. Ids are derived from
//! the parsed combination, so the handler maps an id back to the configured
//! combinations and lets the dispatcher fan out to every bound application.

use crate::AppCommand;

use mixkeys_core::{Config, CoreError, CoreResult, KeyCombination};

use std::{collections::BTreeSet, panic::Location, str::FromStr, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, HotKeyState, hotkey::HotKey};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Parse a normalized combination into a global-hotkey `HotKey`.
#[track_caller]
pub(crate) fn parse_hotkey(combination: &KeyCombination) -> CoreResult<HotKey> {
    HotKey::from_str(combination.as_str()).map_err(|e| CoreError::HotkeyRegistrationFailed {
        combination: combination.to_string(),
        reason: e.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Configured combinations whose hotkey id equals `hotkey_id`.
pub(crate) fn combinations_for_id(config: &Config, hotkey_id: u32) -> Vec<KeyCombination> {
    config
        .bindings()
        .map(|binding| binding.combination)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter(|combination| {
            parse_hotkey(combination).is_ok_and(|hotkey| hotkey.id() == hotkey_id)
        })
        .collect()
}

/// Forwards pressed global hotkeys to the application loop.
pub struct HotkeyHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Create a handler that reports presses on `command_tx`.
    ///
    /// This struct is `Send` and can live on any thread. It only listens on
    /// the global [`GlobalHotKeyEvent`] channel; registration happens on the
    /// main thread.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run the forwarding loop until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // GlobalHotKeyEvent::receiver() is a crossbeam receiver with a blocking
        // recv(), so one persistent blocking task forwards into tokio. It exits
        // on the first blocking_send() after event_rx is dropped.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if event.state != HotKeyState::Pressed {
                        continue;
                    }

                    debug!(hotkey_id = event.id, "Hotkey pressed");

                    if self
                        .command_tx
                        .send(AppCommand::HotkeyPressed { hotkey_id: event.id })
                        .await
                        .is_err()
                    {
                        info!("Command channel closed, hotkey handler stopping");
                        break;
                    }
                }
            }
        }

        drop(event_rx);

        // The blocking task may be parked in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }
    }
}
