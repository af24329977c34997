//! Shared test doubles and fixtures for the push pipeline workspace.
//!
//! Everything here is deterministic: the clock only moves when told to, the
//! scheduler records instead of executing, and the pusher follows a script.
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

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use pushzone_api::{ApiError, ApiResult};
use pushzone_engine::{Scheduler, Task, TaskKind, ZoneApi};
use pushzone_store::Clock;
use tempfile::TempDir;

/// A clock that only advances when a test tells it to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start the clock at the current wall time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc::now()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A scheduler that records tasks for the test to drain by hand.
#[derive(Default)]
pub struct RecordingScheduler {
    queue: Mutex<VecDeque<(Task, Duration)>>,
}

impl RecordingScheduler {
    /// An empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the next pending task, ignoring its delay.
    #[must_use]
    pub fn take_next(&self) -> Option<Task> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .map(|(task, _)| task)
    }

    /// Snapshot of the pending tasks in schedule order.
    #[must_use]
    pub fn pending(&self) -> Vec<Task> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(task, _)| *task)
            .collect()
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule(&self, task: Task, delay: Duration) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back((task, delay));
    }

    fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(task, _)| task.kind() == kind)
    }

    fn clear(&self, kind: TaskKind) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(task, _)| task.kind() != kind);
    }
}

/// A zone API double that records calls and fails on request.
pub struct ScriptedPusher {
    pushed: Mutex<Vec<String>>,
    purged: Mutex<Vec<String>>,
    zone_purges: Mutex<usize>,
    fail_on: Mutex<HashSet<String>>,
    configured: Mutex<bool>,
}

impl ScriptedPusher {
    /// A configured pusher that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pushed: Mutex::new(Vec::new()),
            purged: Mutex::new(Vec::new()),
            zone_purges: Mutex::new(0),
            fail_on: Mutex::new(HashSet::new()),
            configured: Mutex::new(true),
        }
    }

    /// Make pushes of `relative_path` fail with a 500 status.
    pub fn fail_on(&self, relative_path: impl Into<String>) {
        self.fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(relative_path.into());
    }

    /// Toggle whether credentials appear configured.
    pub fn set_configured(&self, configured: bool) {
        *self
            .configured
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = configured;
    }

    /// Relative paths of successful pushes, in call order.
    #[must_use]
    pub fn pushed(&self) -> Vec<String> {
        self.pushed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// URLs purged so far, in call order.
    #[must_use]
    pub fn purged(&self) -> Vec<String> {
        self.purged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of whole-zone purges so far.
    #[must_use]
    pub fn zone_purges(&self) -> usize {
        *self
            .zone_purges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ScriptedPusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZoneApi for ScriptedPusher {
    fn is_configured(&self) -> bool {
        *self
            .configured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn push_file(&self, _file_path: &Path, relative_path: &str) -> ApiResult<()> {
        let scripted_failure = self
            .fail_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(relative_path);
        if scripted_failure {
            return Err(ApiError::Status {
                operation: "push_file",
                status: 500,
                body: "scripted failure".to_string(),
            });
        }
        self.pushed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(relative_path.to_string());
        Ok(())
    }

    async fn purge_url(&self, url: &str) -> ApiResult<()> {
        self.purged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        Ok(())
    }

    async fn purge_zone_cache(&self) -> ApiResult<()> {
        *self
            .zone_purges
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

/// Create a temporary site tree containing `files`, each with dummy content.
///
/// # Errors
/// Propagates filesystem errors from fixture creation.
pub fn temp_site(files: &[&str]) -> io::Result<TempDir> {
    let root = TempDir::new()?;
    for file in files {
        let path = root.path().join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, "content")?;
    }
    Ok(root)
}
