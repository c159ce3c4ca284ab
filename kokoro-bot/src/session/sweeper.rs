//! Background removal of idle sessions.
//!
//! The sweeper runs as its own periodic task so reclamation never happens in
//! the request path. It is optional: without a configured TTL no task is
//! spawned and sessions live until the process exits.

use super::store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Sweeper configuration.
#[derive(Debug, Clone, Copy)]
pub struct SweeperConfig {
    /// How long a session may stay untouched before it is removed.
    pub idle_ttl: Duration,
    /// Interval between sweeps.
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(30 * 60),
            interval: Duration::from_secs(60),
        }
    }
}

/// Handle for stopping a running sweeper.
#[derive(Debug, Clone)]
pub struct SweeperHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl SweeperHandle {
    /// Signal the sweep loop to stop.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Periodic task that reaps idle sessions.
#[derive(Debug)]
pub struct IdleSweeper {
    config: SweeperConfig,
    store: Arc<SessionStore>,
}

impl IdleSweeper {
    /// Create a sweeper over the given store.
    #[must_use]
    pub fn new(config: SweeperConfig, store: Arc<SessionStore>) -> Self {
        Self { config, store }
    }

    /// Spawn the sweep loop and return its control handle.
    #[must_use]
    pub fn start(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let handle = SweeperHandle { shutdown_tx };

        let ttl_ms = u64::try_from(self.config.idle_ttl.as_millis()).unwrap_or(u64::MAX);
        let interval = self.config.interval;
        let store = self.store;

        tokio::spawn(async move {
            info!(ttl_ms, interval = ?interval, "session sweeper started");
            loop {
                tokio::select! {
                    () = tokio::time::sleep(interval) => {
                        let removed = store.remove_idle(ttl_ms).await;
                        if removed > 0 {
                            debug!(removed, "swept idle sessions");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("session sweeper shutting down");
                        break;
                    }
                }
            }
        });

        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweeper_removes_idle_sessions() {
        let store = Arc::new(SessionStore::new());
        let session = store.resolve(None).await;
        let token = session.token().to_string();

        let sweeper = IdleSweeper::new(
            SweeperConfig {
                idle_ttl: Duration::from_millis(5),
                interval: Duration::from_millis(10),
            },
            Arc::clone(&store),
        );
        let handle = sweeper.start();

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.get(&token).await.is_none());

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_ends_the_loop() {
        let store = Arc::new(SessionStore::new());
        let handle = IdleSweeper::new(SweeperConfig::default(), store).start();

        // Returns promptly even though the sweep interval is a minute out.
        handle.stop().await;
    }
}
