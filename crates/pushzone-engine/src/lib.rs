//! The chunked push pipeline.
//!
//! Layout: `keys.rs` (persisted keys and timing constants), `scheduler.rs`
//! (the deferred-task capability), `progress.rs` (durable progress and stall
//! detection), `chunks.rs` (the chunk state machine), `lifecycle.rs` (start,
//! reset, and event triggers), `media.rs` (per-file upload hooks), and
//! `admin.rs` (the authorized management surface).
//!
//! Concurrency model: invocations are short-lived and stateless; they
//! coordinate only through the durable store and two expiring advisory
//! leases. Exclusivity is check-then-set, good enough for the hosting
//! platform's coarse invocation cadence, and every lease expires on its own
//! so a crashed invocation never wedges the pipeline.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

pub mod admin;
pub mod chunks;
pub mod error;
pub mod keys;
pub mod lifecycle;
pub mod media;
pub mod progress;
pub mod scheduler;

use std::path::Path;

use async_trait::async_trait;
use pushzone_api::{ApiResult, PushZoneClient};
use pushzone_scanner::{FileManifest, Scanner};

pub use admin::{AdminActions, Authorizer};
pub use chunks::ChunkProcessor;
pub use error::{EngineError, EngineResult};
pub use lifecycle::LifecycleController;
pub use media::MediaHooks;
pub use progress::{ProgressStatus, ProgressTracker};
pub use scheduler::{Scheduler, Task, TaskKind};

/// The pipeline's view of the local file inventory.
pub trait FileSource: Send + Sync {
    /// Number of currently eligible files.
    fn count_files(&self) -> usize;

    /// Slice `[offset, offset + limit)` of the manifest, in scan order.
    fn list_chunk(&self, offset: usize, limit: usize) -> FileManifest;

    /// Invalidate any cached inventory.
    fn clear_cache(&self);
}

impl FileSource for Scanner {
    fn count_files(&self) -> usize {
        Self::count_files(self)
    }

    fn list_chunk(&self, offset: usize, limit: usize) -> FileManifest {
        Self::list_chunk(self, offset, limit)
    }

    fn clear_cache(&self) {
        Self::clear_cache(self);
    }
}

/// The pipeline's view of the remote push zone.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// Whether credentials currently resolve to non-empty values.
    fn is_configured(&self) -> bool;

    /// Upload one local file into the zone.
    ///
    /// # Errors
    /// Surfaces the underlying API failure.
    async fn push_file(&self, file_path: &Path, relative_path: &str) -> ApiResult<()>;

    /// Purge a single URL from the zone cache.
    ///
    /// # Errors
    /// Surfaces the underlying API failure.
    async fn purge_url(&self, url: &str) -> ApiResult<()>;

    /// Purge the entire zone cache.
    ///
    /// # Errors
    /// Surfaces the underlying API failure.
    async fn purge_zone_cache(&self) -> ApiResult<()>;
}

#[async_trait]
impl ZoneApi for PushZoneClient {
    fn is_configured(&self) -> bool {
        Self::is_configured(self)
    }

    async fn push_file(&self, file_path: &Path, relative_path: &str) -> ApiResult<()> {
        Self::push_file(self, file_path, relative_path).await
    }

    async fn purge_url(&self, url: &str) -> ApiResult<()> {
        Self::purge_url(self, url).await
    }

    async fn purge_zone_cache(&self) -> ApiResult<()> {
        Self::purge_zone_cache(self).await
    }
}
