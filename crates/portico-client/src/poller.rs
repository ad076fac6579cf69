//! Background refresh loop for a `NetworkSession`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::session::{NetworkSession, Snapshot};

/// Handle to a running poller. Dropping it stops the loop.
pub struct Poller {
    rx: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl Poller {
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.rx.clone()
    }

    pub fn latest(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Refresh stale queries every `interval`, publishing a snapshot whenever
/// the session's data differs from the last one sent. The first tick fires immediately.
pub fn spawn_poller(session: Arc<NetworkSession>, interval: Duration) -> Poller {
    let (tx, rx) = watch::channel(session.snapshot());
    let task = tokio::spawn(async move {
        info!("Network poller started ({}s)", interval.as_secs_f64());
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // Mutations refetch on their own, so compare even when nothing
            // was stale.
            match session.refresh_if_stale().await {
                Ok(_) => {
                    let snapshot = session.snapshot();
                    tx.send_if_modified(|current| {
                        if *current == snapshot {
                            false
                        } else {
                            *current = snapshot;
                            true
                        }
                    });
                }
                Err(e) => warn!("Network refresh failed: {}", e),
            }
        }
    });
    Poller { rx, task }
}
