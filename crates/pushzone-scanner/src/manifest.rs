//! The ordered file manifest.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One locally discovered file eligible for pushing.
///
/// Produced only by the scanner; identity is the absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path on the local filesystem.
    pub absolute_path: PathBuf,
    /// Path relative to the site root, used as the remote destination.
    pub relative_path: String,
}

/// Ordered list of discovered files; insertion order is scan order.
pub type FileManifest = Vec<FileRecord>;
