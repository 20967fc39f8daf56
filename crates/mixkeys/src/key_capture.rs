//! Hotkey capture bridged to the UI thread.

use crate::TrayCommand;

use mixkeys_core::{
    ApplicationIdentity, CoreError, CoreResult, HotkeyAction, KeyCapture, KeyCombination,
};

use std::{panic::Location, sync::mpsc::RecvTimeoutError, time::Duration};

use error_location::ErrorLocation;
use tao::event_loop::EventLoopProxy;
use tracing::{debug, instrument};
use uuid::Uuid;

/// How long one capture step waits for a key press.
pub(crate) const CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Asks the main thread to record one chord per call.
///
/// Blocks the calling thread, so run it from `spawn_blocking`.
pub struct ChannelCapture {
    tray_proxy: EventLoopProxy<TrayCommand>,
    capture_id: Uuid,
    timeout: Duration,
}

impl ChannelCapture {
    /// Create a capture session reporting to the event loop behind `tray_proxy`.
    pub fn new(tray_proxy: EventLoopProxy<TrayCommand>) -> Self {
        Self {
            tray_proxy,
            capture_id: Uuid::new_v4(),
            timeout: CAPTURE_TIMEOUT,
        }
    }

    /// Correlation id for log lines of this capture session.
    pub fn capture_id(&self) -> Uuid {
        self.capture_id
    }
}

impl KeyCapture for ChannelCapture {
    #[track_caller]
    #[instrument(skip(self), fields(capture_id = %self.capture_id))]
    fn capture_next(
        &mut self,
        app: &ApplicationIdentity,
        action: HotkeyAction,
    ) -> CoreResult<KeyCombination> {
        let (reply_tx, reply_rx) = std::sync::mpsc::channel();

        self.tray_proxy
            .send_event(TrayCommand::BeginCapture {
                app: app.clone(),
                action,
                reply: reply_tx,
            })
            .map_err(|_| CoreError::CaptureFailed {
                reason: "UI event loop closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let combination = reply_rx.recv_timeout(self.timeout).map_err(|e| {
            let reason = match e {
                RecvTimeoutError::Timeout => format!("No key pressed within {:?}", self.timeout),
                RecvTimeoutError::Disconnected => "Capture was cancelled".to_string(),
            };
            CoreError::CaptureFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        debug!(combination = %combination, "Chord captured");

        Ok(combination)
    }
}
