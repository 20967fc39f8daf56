//! Desktop notifications.

use notify_rust::Notification;
use tracing::warn;

const APP_NAME: &str = "Mixkeys";

/// Show a desktop notification, logging if the platform refuses it.
pub fn notify(summary: &str, body: &str) {
    let shown = Notification::new()
        .appname(APP_NAME)
        .summary(summary)
        .body(body)
        .show()
        .map(|_| ());

    if let Err(e) = shown {
        warn!(error = ?e, summary, "Failed to show notification");
    }
}
