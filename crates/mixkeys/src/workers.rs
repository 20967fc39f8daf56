//! Periodic background loops.
//!
//! Both loops run their blocking session queries on the blocking pool and
//! hand results to the main thread. A panicking iteration is logged and the
//! loop carries on with the next tick.

use crate::TrayCommand;

use mixkeys_core::{
    ApplicationIdentity, Reconciler, RescanPlan, SessionDiscovery, VolumeController,
};

use std::{sync::Arc, time::Duration};

use tao::event_loop::EventLoopProxy;
use tokio::{
    sync::watch,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, error, info, instrument, warn};

/// Period of the live-state reconciliation loop.
pub(crate) const RECONCILE_PERIOD: Duration = Duration::from_secs(1);

/// Period of the binding rescan loop.
pub(crate) const RESCAN_PERIOD: Duration = Duration::from_secs(10);

/// Where the loops deliver their results.
pub(crate) trait TraySink: Send + 'static {
    /// Hand `command` to the main thread. `false` once it is gone.
    fn deliver(&self, command: TrayCommand) -> bool;
}

impl TraySink for EventLoopProxy<TrayCommand> {
    fn deliver(&self, command: TrayCommand) -> bool {
        self.send_event(command).is_ok()
    }
}

/// Poll tracked applications and forward their live state to the tray.
#[instrument(skip_all)]
pub(crate) async fn run_reconciliation<S: TraySink>(
    reconciler: Reconciler,
    tracked_rx: watch::Receiver<Vec<ApplicationIdentity>>,
    tray: S,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(RECONCILE_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("Reconciliation loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let tracked = tracked_rx.borrow().clone();
                if tracked.is_empty() {
                    continue;
                }

                let reconciler = reconciler.clone();
                match tokio::task::spawn_blocking(move || reconciler.poll(&tracked)).await {
                    Ok(observations) => {
                        if !tray.deliver(TrayCommand::Observed(observations)) {
                            debug!("Event loop closed, reconciliation loop stopping");
                            break;
                        }
                    }
                    Err(e) => error!(error = ?e, "Reconciliation pass panicked"),
                }
            }
        }
    }
}

/// Re-evaluate binding state, restore sessions that just appeared, and ask
/// the main thread to install missing hooks.
#[instrument(skip_all)]
pub(crate) async fn run_rescan<S: TraySink>(
    controller: Arc<VolumeController>,
    tray: S,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = interval(RESCAN_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut discovery = SessionDiscovery::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                info!("Rescan loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let controller = Arc::clone(&controller);
                let mut scan = std::mem::take(&mut discovery);

                let pass = tokio::task::spawn_blocking(move || {
                    let config = controller.store().snapshot();
                    let plan = RescanPlan::build(&config, controller.directory());

                    for app in scan.scan(&config, controller.directory()) {
                        match controller.restore_remembered(&app) {
                            Ok(true) => info!(app = %app, "Restored remembered state on new session"),
                            Ok(false) => {}
                            Err(e) => warn!(app = %app, error = ?e, "Failed to restore remembered state"),
                        }
                    }

                    (plan, scan)
                })
                .await;

                match pass {
                    Ok((plan, scan)) => {
                        discovery = scan;

                        let combinations = plan.combinations();
                        debug!(
                            bindings = combinations.len(),
                            active = plan.active().count(),
                            "Rescan complete"
                        );
                        if combinations.is_empty() {
                            continue;
                        }
                        if !tray.deliver(TrayCommand::InstallHotkeys(combinations)) {
                            debug!("Event loop closed, rescan loop stopping");
                            break;
                        }
                    }
                    Err(e) => error!(error = ?e, "Rescan pass panicked"),
                }
            }
        }
    }
}
