//! Durable progress tracking and stall detection.

use std::sync::Arc;

use pushzone_store::{CacheStore, Clock, KvStore, get_json, set_json};
use serde::{Deserialize, Serialize};

use crate::keys::{
    PROCESSED_FILES_KEY, PROCESSING_CHUNK_KEY, PROGRESS_KEY, PUSHING_FILES_KEY, STALL_THRESHOLD,
    TOTAL_FILES_KEY,
};

/// The JSON record persisted under [`PROGRESS_KEY`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Rounded completion percentage, clamped to 100.
    pub percentage: u8,
    /// Unix timestamp of the last progress write; 0 when never written.
    pub last_update: i64,
}

/// Point-in-time view of a run, assembled for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStatus {
    /// File count captured when the run started.
    pub total: usize,
    /// Files handled so far, successes and failures alike.
    pub processed: usize,
    /// Rounded completion percentage.
    pub percentage: u8,
    /// Whether the run-level lease is held.
    pub is_active: bool,
    /// Whether a chunk-level lease is held right now.
    pub is_processing: bool,
    /// Whether an active run has gone silent past the stall threshold.
    pub stalled: bool,
}

/// Reads and writes the durable progress records of a run.
#[derive(Clone)]
pub struct ProgressTracker {
    kv: Arc<dyn KvStore>,
    cache: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl ProgressTracker {
    /// Construct a tracker over the given stores.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>, cache: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { kv, cache, clock }
    }

    /// Persist a progress snapshot: totals, processed count, and the
    /// timestamped percentage record.
    pub fn record(&self, total: usize, processed: usize) {
        self.kv.set(TOTAL_FILES_KEY, &total.to_string());
        self.kv.set(PROCESSED_FILES_KEY, &processed.to_string());
        set_json(
            self.kv.as_ref(),
            PROGRESS_KEY,
            &ProgressRecord {
                percentage: percentage(processed, total),
                last_update: self.clock.now().timestamp(),
            },
        );
    }

    /// Remove every durable progress record.
    pub fn clear(&self) {
        self.kv.delete(TOTAL_FILES_KEY);
        self.kv.delete(PROCESSED_FILES_KEY);
        self.kv.delete(PROGRESS_KEY);
    }

    /// Assemble the current status from the durable records and leases.
    ///
    /// A run is stalled when its lease is still held but no progress has been
    /// written for longer than [`STALL_THRESHOLD`]; the lease TTLs make this
    /// self-healing, so stalled is advisory, not an error.
    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        let total = self.counter(TOTAL_FILES_KEY);
        let processed = self.counter(PROCESSED_FILES_KEY);
        let record: ProgressRecord =
            get_json(self.kv.as_ref(), PROGRESS_KEY).unwrap_or_default();

        let is_active = self.cache.get(PUSHING_FILES_KEY).is_some();
        let is_processing = self.cache.get(PROCESSING_CHUNK_KEY).is_some();

        let stall_cutoff = i64::try_from(STALL_THRESHOLD.as_secs()).unwrap_or(i64::MAX);
        let stalled = is_active
            && record.last_update > 0
            && self.clock.now().timestamp() - record.last_update > stall_cutoff;

        ProgressStatus {
            total,
            processed,
            percentage: percentage(processed, total),
            is_active,
            is_processing,
            stalled,
        }
    }

    fn counter(&self, key: &str) -> usize {
        self.kv
            .get(key)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0)
    }
}

/// Rounded completion percentage, clamped to 100; 0 when the total is 0.
#[must_use]
pub fn percentage(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (processed * 100 + total / 2) / total;
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
