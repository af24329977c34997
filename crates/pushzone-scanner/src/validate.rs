//! Per-file validation applied immediately before an upload.

use std::fs;
use std::path::{Path, PathBuf};

use pushzone_config::{DirectoryPolicy, mime_type_for};
use thiserror::Error;

/// Largest file accepted for pushing.
pub const MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// MIME types accepted for pushing, matching the extension allow-list.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "text/css",
    "text/javascript",
    "application/javascript",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "application/font-woff",
    "application/font-woff2",
    "application/x-font-ttf",
    "application/vnd.ms-fontobject",
    "image/x-icon",
];

/// Why a file was rejected before upload.
///
/// Messages are constant; the offending path stays a structured field so a
/// rendered error never carries an absolute filesystem path into a log sink.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The file does not exist or is not a regular file.
    #[error("file is missing or not a regular file")]
    Missing {
        /// Path that failed the existence check.
        path: PathBuf,
    },
    /// The file exceeds [`MAX_FILE_SIZE_BYTES`].
    #[error("file exceeds the size limit")]
    TooLarge {
        /// Path that failed the size check.
        path: PathBuf,
        /// Observed size in bytes.
        size: u64,
    },
    /// The extension is not on the configured allow-list.
    #[error("file extension is not included")]
    ExtensionExcluded {
        /// Path that failed the extension check.
        path: PathBuf,
        /// Lowercased extension that was rejected.
        extension: String,
    },
    /// The MIME type derived from the extension is not accepted.
    #[error("file mime type is not accepted")]
    MimeExcluded {
        /// Path that failed the MIME check.
        path: PathBuf,
        /// MIME type that was rejected.
        mime: String,
    },
}

/// Validates individual files against the active policy before upload.
///
/// Checks run in order: existence, size, extension, MIME type. The first
/// failure wins.
#[derive(Debug, Clone)]
pub struct FileValidator {
    policy: DirectoryPolicy,
    max_size: u64,
}

impl FileValidator {
    /// Construct a validator for the given policy.
    #[must_use]
    pub const fn new(policy: DirectoryPolicy) -> Self {
        Self {
            policy,
            max_size: MAX_FILE_SIZE_BYTES,
        }
    }

    /// Override the size limit, for tests that cannot allocate 100 MiB.
    #[must_use]
    pub const fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Validate one file, returning the first failed check.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] naming the failed check.
    pub fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        let metadata = fs::metadata(path).map_err(|_| ValidationError::Missing {
            path: path.to_path_buf(),
        })?;
        if !metadata.is_file() {
            return Err(ValidationError::Missing {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() > self.max_size {
            return Err(ValidationError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
            });
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !self.policy.extension_included(&extension) {
            return Err(ValidationError::ExtensionExcluded {
                path: path.to_path_buf(),
                extension,
            });
        }

        let mime = mime_type_for(&extension).unwrap_or("application/octet-stream");
        if !ALLOWED_MIME_TYPES.contains(&mime) {
            return Err(ValidationError::MimeExcluded {
                path: path.to_path_buf(),
                mime: mime.to_string(),
            });
        }

        Ok(())
    }
}
