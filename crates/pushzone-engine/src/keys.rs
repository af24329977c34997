//! Persisted keys and timing constants shared by the pipeline.

use std::time::Duration;

/// Durable key: file count captured when a full run starts.
pub const TOTAL_FILES_KEY: &str = "total_files";

/// Durable key: cumulative count of files handled so far in this run.
pub const PROCESSED_FILES_KEY: &str = "processed_files";

/// Durable key: JSON progress record (`percentage`, `last_update`).
pub const PROGRESS_KEY: &str = "progress";

/// Cache key: advisory lease held while a full run is active.
pub const PUSHING_FILES_KEY: &str = "pushing_files";

/// Cache key: advisory lease held while one chunk is in flight.
pub const PROCESSING_CHUNK_KEY: &str = "processing_chunk";

/// Lifetime of the run-level lease; a crashed run self-heals after this.
pub const PUSH_LEASE_TTL: Duration = Duration::from_secs(3600);

/// Lifetime of the chunk-level lease; a crashed chunk self-heals after this.
pub const CHUNK_LEASE_TTL: Duration = Duration::from_secs(300);

/// Files handled per chunk invocation.
pub const CHUNK_SIZE: usize = 20;

/// Pause between consecutive uploads inside one chunk.
pub const INTER_FILE_DELAY: Duration = Duration::from_millis(100);

/// Deferral before the next chunk invocation is due.
pub const NEXT_CHUNK_DELAY: Duration = Duration::from_secs(5);

/// A run with no progress update for longer than this is considered stalled.
pub const STALL_THRESHOLD: Duration = Duration::from_secs(300);
