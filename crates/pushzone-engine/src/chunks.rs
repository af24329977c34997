//! Chunked push execution.
//!
//! A full run is a chain of short invocations: `PushAllFiles` captures the
//! total and schedules the chunk at offset 0; each `ProcessChunk` handles a
//! fixed-size slice, persists progress, and schedules its successor; the
//! first empty slice terminates the run and releases both leases. Invocations
//! share no memory, only the durable records and the two cache leases.

use std::sync::Arc;
use std::time::Duration;

use pushzone_config::SettingsStore;
use pushzone_scanner::FileValidator;
use pushzone_store::CacheStore;
use tracing::{debug, info, warn};

use crate::keys::{
    CHUNK_LEASE_TTL, CHUNK_SIZE, INTER_FILE_DELAY, NEXT_CHUNK_DELAY, PROCESSING_CHUNK_KEY,
    PUSH_LEASE_TTL, PUSHING_FILES_KEY,
};
use crate::progress::ProgressTracker;
use crate::scheduler::{Scheduler, Task};
use crate::{FileSource, ZoneApi};

/// Executes the scheduled tasks of a full push run.
#[derive(Clone)]
pub struct ChunkProcessor {
    cache: Arc<dyn CacheStore>,
    scheduler: Arc<dyn Scheduler>,
    source: Arc<dyn FileSource>,
    api: Arc<dyn ZoneApi>,
    settings: SettingsStore,
    progress: ProgressTracker,
    inter_file_delay: Duration,
    next_chunk_delay: Duration,
}

impl ChunkProcessor {
    /// Construct a processor over the injected capabilities.
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheStore>,
        scheduler: Arc<dyn Scheduler>,
        source: Arc<dyn FileSource>,
        api: Arc<dyn ZoneApi>,
        settings: SettingsStore,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            cache,
            scheduler,
            source,
            api,
            settings,
            progress,
            inter_file_delay: INTER_FILE_DELAY,
            next_chunk_delay: NEXT_CHUNK_DELAY,
        }
    }

    /// Override the pause between uploads (tests).
    #[must_use]
    pub const fn with_inter_file_delay(mut self, delay: Duration) -> Self {
        self.inter_file_delay = delay;
        self
    }

    /// Override the deferral before the next chunk (tests).
    #[must_use]
    pub const fn with_next_chunk_delay(mut self, delay: Duration) -> Self {
        self.next_chunk_delay = delay;
        self
    }

    /// Execute one scheduled task to completion.
    pub async fn run(&self, task: Task) {
        match task {
            Task::PushAllFiles => self.start_full_push(),
            Task::ProcessChunk { offset } => self.process_chunk(offset).await,
        }
    }

    /// Begin a full run: rescan, capture the total, schedule chunk 0.
    ///
    /// Skipped when a chunk lease is held, so a start request cannot
    /// interleave with a run already making progress.
    pub fn start_full_push(&self) {
        if self.cache.get(PROCESSING_CHUNK_KEY).is_some() {
            warn!("full push requested while a chunk is in flight, skipping");
            return;
        }

        self.cache.set(PUSHING_FILES_KEY, "1", PUSH_LEASE_TTL);
        self.source.clear_cache();
        let total = self.source.count_files();
        self.progress.record(total, 0);
        info!(total, "starting full push");

        self.scheduler
            .schedule(Task::ProcessChunk { offset: 0 }, Duration::ZERO);
    }

    /// Process the chunk starting at `offset`.
    ///
    /// Every file in the slice counts as processed whether or not its upload
    /// succeeded; a failed file is logged and picked up by the next full run.
    /// The first empty slice is the terminal state and releases both leases.
    pub async fn process_chunk(&self, offset: usize) {
        if self.cache.get(PROCESSING_CHUNK_KEY).is_some() {
            warn!(offset, "chunk requested while another is in flight, skipping");
            return;
        }
        self.cache.set(PROCESSING_CHUNK_KEY, "1", CHUNK_LEASE_TTL);

        let files = self.source.list_chunk(offset, CHUNK_SIZE);
        if files.is_empty() {
            self.cache.delete(PROCESSING_CHUNK_KEY);
            self.cache.delete(PUSHING_FILES_KEY);
            info!(offset, "full push complete");
            return;
        }

        let status = self.progress.status();
        let total = status.total;
        let mut processed = status.processed;
        let validator = FileValidator::new(self.settings.load().directory_policy());

        for record in &files {
            match validator.validate(&record.absolute_path) {
                Ok(()) => {
                    if let Err(err) = self
                        .api
                        .push_file(&record.absolute_path, &record.relative_path)
                        .await
                    {
                        warn!(file = %record.relative_path, error = %err, "push failed");
                    }
                }
                Err(err) => {
                    warn!(file = %record.relative_path, error = %err, "skipping invalid file");
                }
            }
            processed += 1;
            self.progress.record(total, processed);
            if !self.inter_file_delay.is_zero() {
                tokio::time::sleep(self.inter_file_delay).await;
            }
        }

        debug!(offset, handled = files.len(), processed, "chunk complete");
        self.cache.delete(PROCESSING_CHUNK_KEY);
        self.scheduler.schedule(
            Task::ProcessChunk {
                offset: offset + CHUNK_SIZE,
            },
            self.next_chunk_delay,
        );
    }
}
