//! Typed settings models.
//!
//! # Design
//! - One aggregate blob persisted as a unit, with serde defaults so records
//!   written by older versions keep loading.
//! - `DirectoryPolicy` is a snapshot derived from the blob; the scanner never
//!   reads settings fields directly.

use serde::{Deserialize, Serialize};

/// Site-relative directory that holds uploaded media by default.
pub const DEFAULT_UPLOAD_DIR: &str = "wp-content/uploads";

/// File extensions pushed when the settings blob carries no explicit list.
pub const DEFAULT_INCLUDED_EXTENSIONS: &[&str] = &[
    "css", "js", "jpeg", "jpg", "png", "gif", "webp", "svg", "ttf", "woff", "woff2", "eot", "ico",
];

/// Directories never scanned, regardless of policy.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["wp-admin", "wp-includes"];

/// Aggregate plugin settings persisted as a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API key for the push zone provider. May be overridden by a
    /// deploy-time constant or environment variable; see
    /// [`crate::credentials::Credentials::resolve`].
    pub api_key: String,
    /// Identifier of the remote push zone.
    pub push_zone_id: String,
    /// Hostname the CDN serves files from, used to build purge URLs.
    pub cdn_url: String,
    /// Re-push all static files after a theme or plugin update.
    pub push_static_files: bool,
    /// Schedule a full push whenever the settings are saved.
    pub push_on_settings_update: bool,
    /// Include the default upload directory in scans.
    pub include_default_upload_dir: bool,
    /// Additional site-relative directories to scan, in display order.
    pub custom_directories: Vec<CustomDirectory>,
    /// Directory name fragments that prune a subtree when matched anywhere
    /// in the absolute path.
    pub excluded_dirs: Vec<String>,
    /// Lowercase file extensions eligible for pushing.
    pub included_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            push_zone_id: String::new(),
            cdn_url: String::new(),
            push_static_files: false,
            push_on_settings_update: false,
            include_default_upload_dir: true,
            custom_directories: Vec::new(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(ToString::to_string)
                .collect(),
            included_extensions: DEFAULT_INCLUDED_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Settings {
    /// CDN hostname with any scheme prefix stripped.
    #[must_use]
    pub fn cdn_host(&self) -> String {
        self.cdn_url
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string()
    }

    /// Snapshot of the fields the directory scanner consumes.
    #[must_use]
    pub fn directory_policy(&self) -> DirectoryPolicy {
        DirectoryPolicy {
            include_default_upload_dir: self.include_default_upload_dir,
            default_upload_dir: DEFAULT_UPLOAD_DIR.to_string(),
            custom_directories: self.custom_directories.clone(),
            excluded_dirs: self.excluded_dirs.clone(),
            included_extensions: self
                .included_extensions
                .iter()
                .map(|ext| ext.trim().to_lowercase())
                .collect(),
        }
    }
}

/// A user-configured scan root and its enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomDirectory {
    /// Site-relative directory path.
    pub path: String,
    /// Whether this directory participates in scans.
    pub enabled: bool,
}

impl CustomDirectory {
    /// Convenience constructor.
    #[must_use]
    pub fn new(path: impl Into<String>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
        }
    }
}

/// Inclusion/exclusion rules applied during a directory scan.
///
/// Insertion order of `custom_directories` is preserved for display; lookup
/// is by path. A directory is eligible iff it is not under any excluded
/// fragment and either falls under the default upload directory (when
/// enabled) or under an enabled custom directory; with no custom directories
/// configured and the default flag on, every directory is eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPolicy {
    /// Include the default upload directory in scans.
    pub include_default_upload_dir: bool,
    /// Site-relative path of the default upload directory.
    pub default_upload_dir: String,
    /// Custom scan roots in display order.
    pub custom_directories: Vec<CustomDirectory>,
    /// Substring fragments that exclude whole subtrees.
    pub excluded_dirs: Vec<String>,
    /// Lowercase extensions eligible for pushing.
    pub included_extensions: Vec<String>,
}

impl DirectoryPolicy {
    /// Enabled flag for a custom directory, if configured.
    #[must_use]
    pub fn custom_directory(&self, path: &str) -> Option<bool> {
        self.custom_directories
            .iter()
            .find(|dir| dir.path == path)
            .map(|dir| dir.enabled)
    }

    /// Whether `extension` (compared lowercase) is eligible for pushing.
    #[must_use]
    pub fn extension_included(&self, extension: &str) -> bool {
        let lowered = extension.to_lowercase();
        self.included_extensions.iter().any(|ext| *ext == lowered)
    }
}

/// Content type for a pushed file, derived from its lowercase extension.
///
/// Only the static asset types the pipeline is willing to upload are mapped;
/// anything else is rejected by validation before a request is built.
#[must_use]
pub fn mime_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "css" => Some("text/css"),
        "js" => Some("application/javascript"),
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "ttf" => Some("application/x-font-ttf"),
        "woff" => Some("application/font-woff"),
        "woff2" => Some("application/font-woff2"),
        "eot" => Some("application/vnd.ms-fontobject"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}
