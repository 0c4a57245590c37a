//! Periodic reconciliation against the ledger.

use crate::ledger::AssetKind;
use crate::sync::engine::AssetSyncEngine;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Default wall-clock interval between reconciliation cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Background task that keeps the cache warm and eventually consistent
/// with the ledger even when no player is issuing commands.
///
/// Every tick it walks the linked wallets and reads each wallet's rank
/// and item through the engine, relying on `get_asset`'s reconciliation
/// side effect; it performs no writes of its own. When the monitor says
/// the ledger is down, the cycle starts with a probe instead, which is
/// how the system notices recovery after an outage.
///
/// States: Stopped and Running. A cycle that overruns the interval delays
/// the next tick; cycles never overlap.
pub struct ReconciliationPoller {
    engine: Arc<AssetSyncEngine>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ReconciliationPoller {
    pub fn new(engine: Arc<AssetSyncEngine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            task: Mutex::new(None),
        }
    }

    /// Start or resume polling. Does nothing if already running.
    pub fn resume(&self) {
        let mut task = self.task.lock().unwrap();
        if task.is_some() {
            return;
        }
        let engine = self.engine.clone();
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                Self::cycle(&engine).await;
            }
        }));
        info!("Reconciliation polling started (every {:?})", period);
    }

    /// Pause polling. Does nothing if already stopped.
    pub fn pause(&self) {
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
            info!("Reconciliation polling paused");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().unwrap().is_some()
    }

    /// Run a single reconciliation cycle immediately, outside the timer.
    pub async fn run_once(&self) {
        Self::cycle(&self.engine).await;
    }

    async fn cycle(engine: &AssetSyncEngine) {
        if !engine.monitor().is_available() && !engine.probe().await {
            // Still down (or no ledger configured); cache reads would be
            // no-ops, so skip the walk entirely.
            return;
        }
        let wallets = engine.linked_wallets();
        debug!("Reconciling {} linked wallet(s)", wallets.len());
        for wallet in wallets {
            engine.get_asset(&wallet, AssetKind::Rank).await;
            engine.get_asset(&wallet, AssetKind::Item).await;
        }
    }
}

impl Drop for ReconciliationPoller {
    fn drop(&mut self) {
        self.pause();
    }
}
