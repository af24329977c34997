//! Run lifecycle: idempotent start, reset, and settings-driven triggers.

use std::sync::Arc;
use std::time::Duration;

use pushzone_api::RATE_LIMIT_KEY;
use pushzone_config::{Settings, SettingsStore};
use pushzone_store::{CacheStore, KvStore};
use tracing::{debug, info};

use crate::keys::{PROCESSING_CHUNK_KEY, PUSH_LEASE_TTL, PUSHING_FILES_KEY};
use crate::progress::ProgressTracker;
use crate::scheduler::{Scheduler, Task, TaskKind};
use crate::{FileSource, ZoneApi};

/// Starts, cancels, and reacts to the events that drive full push runs.
#[derive(Clone)]
pub struct LifecycleController {
    kv: Arc<dyn KvStore>,
    cache: Arc<dyn CacheStore>,
    scheduler: Arc<dyn Scheduler>,
    source: Arc<dyn FileSource>,
    api: Arc<dyn ZoneApi>,
    settings: SettingsStore,
    progress: ProgressTracker,
}

impl LifecycleController {
    /// Construct a controller over the injected capabilities.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kv: Arc<dyn KvStore>,
        cache: Arc<dyn CacheStore>,
        scheduler: Arc<dyn Scheduler>,
        source: Arc<dyn FileSource>,
        api: Arc<dyn ZoneApi>,
        settings: SettingsStore,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            kv,
            cache,
            scheduler,
            source,
            api,
            settings,
            progress,
        }
    }

    /// Schedule a full push unless one is already pending or active.
    ///
    /// Takes the run-level lease before enqueueing, so concurrent requests
    /// collapse into one run. Returns whether a run was actually scheduled.
    pub fn schedule_full_push(&self) -> bool {
        if self.scheduler.is_scheduled(TaskKind::PushAllFiles)
            || self.cache.get(PUSHING_FILES_KEY).is_some()
        {
            debug!("full push already pending or active, not scheduling another");
            return false;
        }
        self.cache.set(PUSHING_FILES_KEY, "1", PUSH_LEASE_TTL);
        self.scheduler.schedule(Task::PushAllFiles, Duration::ZERO);
        info!("full push scheduled");
        true
    }

    /// Abort any run and return the pipeline to a clean idle state.
    ///
    /// Safe at any point in a run: pending tasks are dropped, both leases
    /// released, durable progress cleared, and the scan cache invalidated.
    pub fn reset(&self) {
        self.scheduler.clear(TaskKind::PushAllFiles);
        self.scheduler.clear(TaskKind::ProcessChunk);
        self.cache.delete(PUSHING_FILES_KEY);
        self.cache.delete(PROCESSING_CHUNK_KEY);
        self.progress.clear();
        self.source.clear_cache();
        info!("push pipeline reset");
    }

    /// Persist a settings change and react to it.
    ///
    /// Any change may affect the directory policy, so the scan cache is
    /// always invalidated. When the saved settings request a push on update
    /// and credentials resolve, a full push is scheduled.
    pub fn apply_settings(&self, mutate: impl FnOnce(&mut Settings)) -> Settings {
        let updated = self.settings.update(mutate);
        self.source.clear_cache();
        if updated.push_on_settings_update && self.api.is_configured() {
            self.schedule_full_push();
        }
        updated
    }

    /// React to a theme or plugin update by re-pushing static files, when
    /// that behavior is enabled and credentials resolve.
    pub fn on_assets_updated(&self) {
        if self.settings.load().push_static_files && self.api.is_configured() {
            self.schedule_full_push();
        }
    }

    /// Remove every trace of the pipeline from the stores (uninstall path).
    pub fn uninstall(&self) {
        self.reset();
        self.settings.delete();
        self.kv.delete(RATE_LIMIT_KEY);
        info!("push pipeline uninstalled");
    }
}
