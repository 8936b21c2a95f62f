//! Periodic refresh task with explicit lifecycle
//!
//! One task per record collection. The task ticks at a fixed interval and
//! refreshes its store; a failed tick logs and keeps the loop alive. The
//! task stops only on an explicit shutdown signal, and the scheduler cancels
//! any previous task before starting a new one so at most one loop runs per
//! collection.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::service::RecordSource;
use crate::store::{RecordStore, RefreshOutcome};

/// Handle to a running refresh loop
pub struct RefreshTask {
    name: String,
    handle: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
}

impl RefreshTask {
    /// Spawn a refresh loop that ticks every `interval`
    ///
    /// The first refresh runs on the first tick, immediately after spawn.
    pub fn spawn<T, S>(
        name: impl Into<String>,
        store: Arc<RecordStore<T>>,
        source: Arc<S>,
        interval: Duration,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
        S: RecordSource<T> + 'static,
    {
        let name = name.into();
        let task_name = name.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("Refresh task '{}' started ({:?} interval)", task_name, interval);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        debug!("Refresh task '{}' received shutdown signal", task_name);
                        break;
                    }
                    _ = ticker.tick() => {
                        match store.refresh(source.as_ref()).await {
                            Ok(RefreshOutcome::Applied(count)) => {
                                debug!("Refresh task '{}' applied {} records", task_name, count);
                            }
                            Ok(RefreshOutcome::Stale) => {
                                debug!("Refresh task '{}' dropped a stale response", task_name);
                            }
                            Err(err) => {
                                warn!("Refresh task '{}' tick failed: {}", task_name, err);
                            }
                        }
                    }
                }
            }
            info!("Refresh task '{}' stopped", task_name);
        });

        Self {
            name,
            handle,
            shutdown_tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal shutdown and wait for the loop to exit
    ///
    /// An in-flight fetch is aborted rather than awaited; the store's
    /// generation check keeps a torn response from ever being applied.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.handle.abort();
        let _ = self.handle.await;
        debug!("Refresh task '{}' shut down", self.name);
    }
}

/// Owns at most one running [`RefreshTask`] for a collection
///
/// Restarting (after a filter or selection change invalidates the old loop's
/// configuration) always cancels the previous task first.
#[derive(Default)]
pub struct RefreshScheduler {
    current: Option<RefreshTask>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self { current: None }
    }

    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Start a refresh loop, cancelling any previous one first
    pub async fn start<T, S>(
        &mut self,
        name: impl Into<String>,
        store: Arc<RecordStore<T>>,
        source: Arc<S>,
        interval: Duration,
    ) where
        T: Clone + Send + Sync + 'static,
        S: RecordSource<T> + 'static,
    {
        self.stop().await;
        self.current = Some(RefreshTask::spawn(name, store, source, interval));
    }

    /// Stop the current refresh loop, if any
    pub async fn stop(&mut self) {
        if let Some(task) = self.current.take() {
            task.stop().await;
        }
    }
}
