//! Diagnostics — per-metric operations-per-second counters.
//!
//! Counters are incremented lock-free from hot paths. A single background
//! ticker fires every second, snapshots each counter's current count into its
//! last-observed rate and resets the count to zero.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::shutdown::SystemCancellationToken;

/// A monotonically increasing per-second counter with a last-observed rate.
#[derive(Debug)]
pub struct OperationsPerSecondCounter {
    uid: String,
    current: AtomicU64,
    last_rate: AtomicU64,
}

impl OperationsPerSecondCounter {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            current: AtomicU64::new(0),
            last_rate: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Count one operation. Lock-free.
    pub fn increment(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    /// The rate observed at the most recent tick.
    #[must_use]
    pub fn last_rate(&self) -> u64 {
        self.last_rate.load(Ordering::Relaxed)
    }

    /// Snapshot `current` into `last_rate` and reset. Called by the ticker.
    pub fn tick(&self) {
        let value = self.current.swap(0, Ordering::Relaxed);
        self.last_rate.store(value, Ordering::Relaxed);
    }
}

/// Registry of OPS counters plus the 1 s ticker loop.
#[derive(Debug, Default)]
pub struct DiagnosticsService {
    counters: Mutex<Vec<Arc<OperationsPerSecondCounter>>>,
}

impl DiagnosticsService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new counter.
    pub fn register_operations_per_second_counter(
        &self,
        uid: impl Into<String>,
    ) -> Arc<OperationsPerSecondCounter> {
        let counter = Arc::new(OperationsPerSecondCounter::new(uid));
        self.counters
            .lock()
            .expect("mutex poisoned")
            .push(Arc::clone(&counter));
        counter
    }

    /// Tick every registered counter once.
    pub fn tick_all(&self) {
        let counters = self.counters.lock().expect("mutex poisoned");
        for counter in counters.iter() {
            counter.tick();
        }
    }

    /// Run the 1 s ticker until the shutdown signal fires.
    pub async fn run_ticker(self: Arc<Self>, shutdown: SystemCancellationToken) {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick_all(),
                () = shutdown.cancelled() => {
                    tracing::debug!("diagnostics ticker stopping");
                    return;
                }
            }
        }
    }
}
