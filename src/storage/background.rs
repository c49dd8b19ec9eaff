//! Background Manager
//!
//! One background task owns the periodic maintenance of the store: sweeping
//! expired keys and flushing batched snapshots. Each iteration it
//!
//! 1. sleeps for the configured interval (1 second by default),
//! 2. tries to take the store lock exclusively; if workers are busy with it,
//!    the whole iteration is skipped rather than stalling them,
//! 3. removes every key whose deadline has passed, and
//! 4. flushes a snapshot when the dirty counter has reached the batch size.
//!
//! TTL resolution is therefore about one second; nothing stricter is
//! promised.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::storage::engine::{now_ms, StoreEngine};

/// Configuration for the background manager.
#[derive(Debug, Clone)]
pub struct BackgroundConfig {
    /// Time between iterations. Tests shrink this; the server default is 1s.
    pub interval: Duration,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// Handle to the running background manager.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct BackgroundManager {
    shutdown_tx: watch::Sender<bool>,
}

impl BackgroundManager {
    /// Spawns the manager task for the given engine.
    pub fn start(engine: Arc<StoreEngine>, config: BackgroundConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(manager_loop(engine, config, shutdown_rx));
        info!("background manager started");
        Self { shutdown_tx }
    }

    /// Stops the manager task. Called automatically on drop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        debug!("background manager stopped");
    }
}

impl Drop for BackgroundManager {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn manager_loop(
    engine: Arc<StoreEngine>,
    config: BackgroundConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    return;
                }
            }
        }

        // Skip the iteration rather than steal throughput from workers.
        let mut store = match engine.try_write() {
            Some(guard) => guard,
            None => {
                trace!("store contended, skipping background iteration");
                continue;
            }
        };

        let swept = store.sweep_expired(now_ms());
        if !swept.is_empty() {
            debug!(expired = swept.len(), "expired keys removed");
        }

        let batch = engine.settings().batch_size() as u64;
        if batch > 0 && store.dirty() >= batch {
            let ops = store.dirty();
            let path = engine.settings().db_path.clone();
            engine.flush(&mut store, &path);
            debug!(ops = ops, "batch saved to disk");
        }
    }
}
