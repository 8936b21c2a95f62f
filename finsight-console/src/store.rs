//! Record store with generation-counted refreshes
//!
//! The store owns the raw fetched collection that the report pipeline reads
//! from. Refreshes can overlap (a manual refresh racing the periodic one),
//! so each refresh is stamped with a monotonically increasing generation and
//! only the response belonging to the latest issued generation is applied.
//! A stale response is dropped without touching the store.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::service::RecordSource;
use finsight_common::Result;

/// Outcome of a single refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was applied; the store now holds this many records
    Applied(usize),
    /// A newer refresh was issued while this one was in flight; dropped
    Stale,
}

/// Shared store for one record collection
pub struct RecordStore<T> {
    records: RwLock<Vec<T>>,
    generation: AtomicU64,
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Generation of the most recently issued refresh
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl<T: Clone + Send + Sync> RecordStore<T> {
    /// Snapshot of the current records
    pub async fn records(&self) -> Vec<T> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Fetch from the source and replace the store contents
    ///
    /// On a fetch error the store is cleared rather than left holding data
    /// from an older generation, and the error is returned for the caller to
    /// surface. Overlap resolution: whichever refresh was issued last wins,
    /// regardless of completion order.
    pub async fn refresh<S>(&self, source: &S) -> Result<RefreshOutcome>
    where
        S: RecordSource<T> + ?Sized,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Refresh generation {} issued", generation);

        // The staleness check must happen while holding the write guard: a
        // check taken before the lock could pass, lose the race to a newer
        // generation's commit, and then overwrite it with older data.
        match source.fetch().await {
            Ok(records) => {
                let mut guard = self.records.write().await;
                if self.generation.load(Ordering::SeqCst) != generation {
                    debug!("Dropping stale response for generation {}", generation);
                    return Ok(RefreshOutcome::Stale);
                }
                let count = records.len();
                *guard = records;
                debug!(
                    "Refresh generation {} applied: {} records",
                    generation, count
                );
                Ok(RefreshOutcome::Applied(count))
            }
            Err(err) => {
                let mut guard = self.records.write().await;
                if self.generation.load(Ordering::SeqCst) == generation {
                    guard.clear();
                    warn!("Refresh generation {} failed, store cleared: {}", generation, err);
                } else {
                    debug!("Ignoring failure of stale generation {}", generation);
                }
                Err(err)
            }
        }
    }
}
