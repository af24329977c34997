//! Management actions gated by an authorization capability.

use std::sync::Arc;

use crate::ZoneApi;
use crate::error::{EngineError, EngineResult};
use crate::lifecycle::LifecycleController;
use crate::progress::{ProgressStatus, ProgressTracker};

/// Host-provided authorization check for management actions.
pub trait Authorizer: Send + Sync {
    /// Whether the current caller may manage the push pipeline.
    fn can_manage(&self) -> bool;
}

/// The management surface exposed to the host's admin interface.
///
/// Every action checks the [`Authorizer`] first and fails closed.
#[derive(Clone)]
pub struct AdminActions {
    authorizer: Arc<dyn Authorizer>,
    lifecycle: LifecycleController,
    progress: ProgressTracker,
    api: Arc<dyn ZoneApi>,
}

impl AdminActions {
    /// Construct the management surface.
    #[must_use]
    pub fn new(
        authorizer: Arc<dyn Authorizer>,
        lifecycle: LifecycleController,
        progress: ProgressTracker,
        api: Arc<dyn ZoneApi>,
    ) -> Self {
        Self {
            authorizer,
            lifecycle,
            progress,
            api,
        }
    }

    /// Start a full push run.
    ///
    /// # Errors
    /// Fails when the caller is unauthorized or a run is already active.
    pub fn trigger_full_push(&self) -> EngineResult<()> {
        self.authorize()?;
        if self.progress.status().is_active {
            return Err(EngineError::PushAlreadyActive);
        }
        self.lifecycle.schedule_full_push();
        Ok(())
    }

    /// Abort any run and clear all progress state.
    ///
    /// # Errors
    /// Fails when the caller is unauthorized.
    pub fn reset_push(&self) -> EngineResult<()> {
        self.authorize()?;
        self.lifecycle.reset();
        Ok(())
    }

    /// Purge the entire zone cache.
    ///
    /// # Errors
    /// Fails when the caller is unauthorized or the API call fails.
    pub async fn purge_zone_cache(&self) -> EngineResult<()> {
        self.authorize()?;
        self.api.purge_zone_cache().await?;
        Ok(())
    }

    /// Current run status for progress displays.
    ///
    /// # Errors
    /// Fails when the caller is unauthorized.
    pub fn status(&self) -> EngineResult<ProgressStatus> {
        self.authorize()?;
        Ok(self.progress.status())
    }

    fn authorize(&self) -> EngineResult<()> {
        if self.authorizer.can_manage() {
            Ok(())
        } else {
            Err(EngineError::Unauthorized)
        }
    }
}
