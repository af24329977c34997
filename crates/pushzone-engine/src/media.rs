//! Media attachment hooks: push on upload, purge on removal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pushzone_config::SettingsStore;
use pushzone_scanner::FileValidator;
use tracing::debug;

use crate::ZoneApi;
use crate::error::{EngineError, EngineResult};

/// Reacts to individual media files being added or removed.
///
/// Both hooks are no-ops while credentials do not resolve, so an
/// unconfigured installation never errors on routine media activity.
#[derive(Clone)]
pub struct MediaHooks {
    api: Arc<dyn ZoneApi>,
    settings: SettingsStore,
    site_root: PathBuf,
}

impl MediaHooks {
    /// Construct hooks rooted at `site_root`.
    #[must_use]
    pub fn new(api: Arc<dyn ZoneApi>, settings: SettingsStore, site_root: impl Into<PathBuf>) -> Self {
        Self {
            api,
            settings,
            site_root: site_root.into(),
        }
    }

    /// Push a freshly uploaded file into the zone.
    ///
    /// # Errors
    /// Fails when the path is outside the site root, the file fails
    /// validation, or the API call fails.
    pub async fn push_upload(&self, path: &Path) -> EngineResult<()> {
        if !self.api.is_configured() {
            debug!("credentials not configured, ignoring upload");
            return Ok(());
        }
        let relative = self.relative(path)?;
        FileValidator::new(self.settings.load().directory_policy()).validate(path)?;
        self.api.push_file(path, &relative).await?;
        Ok(())
    }

    /// Purge a removed file's URL from the zone cache.
    ///
    /// Skipped silently when no CDN hostname is configured, since no public
    /// URL can be derived.
    ///
    /// # Errors
    /// Fails when the path is outside the site root or the API call fails.
    pub async fn remove_upload(&self, path: &Path) -> EngineResult<()> {
        if !self.api.is_configured() {
            debug!("credentials not configured, ignoring removal");
            return Ok(());
        }
        let relative = self.relative(path)?;
        let host = self.settings.load().cdn_host();
        if host.is_empty() {
            debug!(file = %relative, "no cdn hostname configured, skipping purge");
            return Ok(());
        }
        self.api
            .purge_url(&format!("https://{host}/{relative}"))
            .await?;
        Ok(())
    }

    fn relative(&self, path: &Path) -> EngineResult<String> {
        path.strip_prefix(&self.site_root)
            .map(|relative| relative.to_string_lossy().into_owned())
            .map_err(|_| EngineError::OutsideSiteRoot {
                path: path.to_path_buf(),
            })
    }
}
