//! Deferred task scheduling capability.
//!
//! The pipeline never spawns its own background workers; it hands tasks to an
//! injected scheduler and ends the current invocation. The host decides how
//! "run this later" is realized (a cron-like queue in production, a manual
//! drain in tests).

use std::time::Duration;

/// A unit of deferred work the pipeline hands to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Start a full run: count files and schedule the first chunk.
    PushAllFiles,
    /// Process the chunk starting at `offset` in the manifest.
    ProcessChunk {
        /// Zero-based position of the first file in the chunk.
        offset: usize,
    },
}

impl Task {
    /// The scheduling identity of this task.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::PushAllFiles => TaskKind::PushAllFiles,
            Self::ProcessChunk { .. } => TaskKind::ProcessChunk,
        }
    }
}

/// Task identity used for idempotent scheduling and cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// A [`Task::PushAllFiles`] task.
    PushAllFiles,
    /// A [`Task::ProcessChunk`] task, regardless of offset.
    ProcessChunk,
}

/// Host-provided deferred execution.
pub trait Scheduler: Send + Sync {
    /// Enqueue `task` to run after `delay`.
    fn schedule(&self, task: Task, delay: Duration);

    /// Whether a task of `kind` is already pending.
    fn is_scheduled(&self, kind: TaskKind) -> bool;

    /// Drop all pending tasks of `kind`.
    fn clear(&self, kind: TaskKind);
}
