//! Settings persistence facade over the durable key-value store.

use std::sync::Arc;

use pushzone_store::{KvStore, get_json, set_json};
use tracing::debug;

use crate::model::Settings;

/// Durable-store key holding the aggregate settings blob.
pub const SETTINGS_KEY: &str = "settings";

/// Facade for loading and saving the aggregate [`Settings`] blob.
///
/// Loading never fails: a missing or unparseable record yields the defaults,
/// mirroring the hosting platform's option semantics.
#[derive(Clone)]
pub struct SettingsStore {
    kv: Arc<dyn KvStore>,
}

impl SettingsStore {
    /// Construct a facade over `kv`.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Load the current settings, falling back to defaults.
    #[must_use]
    pub fn load(&self) -> Settings {
        get_json(self.kv.as_ref(), SETTINGS_KEY).unwrap_or_default()
    }

    /// Persist `settings` as the new aggregate blob.
    pub fn save(&self, settings: &Settings) {
        set_json(self.kv.as_ref(), SETTINGS_KEY, settings);
    }

    /// Load, mutate, and persist the settings in one step.
    ///
    /// Returns the settings as persisted. Callers that change any field
    /// feeding [`Settings::directory_policy`] must invalidate the scanner
    /// cache afterwards.
    pub fn update(&self, mutate: impl FnOnce(&mut Settings)) -> Settings {
        let mut settings = self.load();
        mutate(&mut settings);
        self.save(&settings);
        debug!("settings blob updated");
        settings
    }

    /// Remove the settings blob entirely (uninstall path).
    pub fn delete(&self) {
        self.kv.delete(SETTINGS_KEY);
    }
}
