//! Periodic journal polling with an explicit stop signal.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Delay between automatic journal checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Shared shutdown flag for periodic tasks.
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Calls `tick` every `period`, starting one period from now, until the
/// stop signal fires. A late tick is delayed rather than bunched up.
pub async fn run_periodic<F>(period: Duration, mut stop: watch::Receiver<bool>, mut tick: F)
where
    F: FnMut(),
{
    if *stop.borrow_and_update() {
        return;
    }
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => tick(),
            changed = stop.changed() => {
                // A dropped sender also ends the loop.
                if changed.is_err() || *stop.borrow_and_update() {
                    log::debug!("Periodic task stopped");
                    return;
                }
            }
        }
    }
}
