//! Ledger availability tracking.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use tracing::{info, warn};

/// Tracks whether the ledger is currently reachable, based on recent
/// operation outcomes. The most recent outcome wins.
///
/// The monitor has no knowledge of why a call failed: contract-level
/// rejections count as unavailability the same way timeouts do, so one
/// consistently-rejecting call flips the whole system to offline mode.
pub struct AvailabilityMonitor {
    state: Mutex<MonitorState>,
}

struct MonitorState {
    available: bool,
    since: DateTime<Utc>,
}

impl AvailabilityMonitor {
    /// Starts offline; the first successful ledger probe flips it online.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MonitorState {
                available: false,
                since: Utc::now(),
            }),
        }
    }

    /// Feed the outcome of a ledger call into the monitor.
    pub fn record_outcome(&self, success: bool) {
        let mut state = self.state.lock().unwrap();
        if state.available != success {
            state.available = success;
            state.since = Utc::now();
            if success {
                info!("Ledger is reachable again");
            } else {
                warn!("Ledger is unreachable, switching to offline fallback");
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.state.lock().unwrap().available
    }

    /// Timestamp of the most recent online/offline transition.
    pub fn last_transition(&self) -> DateTime<Utc> {
        self.state.lock().unwrap().since
    }
}

impl Default for AvailabilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_offline() {
        let monitor = AvailabilityMonitor::new();
        assert!(!monitor.is_available());
    }

    #[test]
    fn most_recent_outcome_wins() {
        let monitor = AvailabilityMonitor::new();

        monitor.record_outcome(true);
        assert!(monitor.is_available());

        monitor.record_outcome(false);
        assert!(!monitor.is_available());

        monitor.record_outcome(true);
        assert!(monitor.is_available());
    }

    #[test]
    fn repeated_outcome_keeps_transition_timestamp() {
        let monitor = AvailabilityMonitor::new();
        monitor.record_outcome(true);
        let first = monitor.last_transition();

        monitor.record_outcome(true);
        assert_eq!(monitor.last_transition(), first);

        monitor.record_outcome(false);
        assert!(monitor.last_transition() >= first);
        assert!(!monitor.is_available());
    }
}
