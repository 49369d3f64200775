//! Periodic removal of expired one-time codes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use architect_core::config::OtpConfig;

use super::registry::OtpRegistry;

/// Background task that purges expired entries from an [`OtpRegistry`].
///
/// Lookups already ignore expired codes; the sweeper only bounds memory.
#[derive(Debug, Clone)]
pub struct OtpSweeper {
    registry: Arc<OtpRegistry>,
    interval: Duration,
}

impl OtpSweeper {
    /// Creates a sweeper using the configured sweep interval.
    pub fn new(registry: Arc<OtpRegistry>, config: &OtpConfig) -> Self {
        Self {
            registry,
            interval: Duration::from_secs(config.sweep_interval_seconds.max(1)),
        }
    }

    /// Runs one sweep, returning the number of entries removed.
    pub fn run_once(&self) -> usize {
        let removed = self.registry.purge_expired();
        if removed > 0 {
            info!(removed, remaining = self.registry.len(), "Swept expired one-time codes");
        }
        removed
    }

    /// Sweeps on every interval tick until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        debug!(interval_seconds = self.interval.as_secs(), "OTP sweeper started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.run_once();
                }
            }
        }

        debug!("OTP sweeper stopped");
    }

    /// Spawns [`run`](Self::run) onto the current runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}
