//! Engine error taxonomy.

use std::path::PathBuf;

use pushzone_api::ApiError;
use pushzone_scanner::ValidationError;
use thiserror::Error;

/// Convenient result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by engine operations.
///
/// Per-file push failures inside a chunk are deliberately absent: they are
/// logged and absorbed so a run always terminates.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The caller is not allowed to perform management actions.
    #[error("caller is not authorized to manage the push pipeline")]
    Unauthorized,

    /// A full run is already active; a second one was refused.
    #[error("a full push is already active")]
    PushAlreadyActive,

    /// A path handed to a media hook does not live under the site root.
    #[error("path is outside the site root: {path}")]
    OutsideSiteRoot {
        /// The offending path.
        path: PathBuf,
    },

    /// A file failed pre-upload validation.
    #[error("file failed validation")]
    Validation {
        /// The failed check.
        #[source]
        source: ValidationError,
    },

    /// An API call failed.
    #[error("push zone api call failed")]
    Api {
        /// The underlying API failure.
        #[source]
        source: ApiError,
    },
}

impl From<ApiError> for EngineError {
    fn from(source: ApiError) -> Self {
        Self::Api { source }
    }
}

impl From<ValidationError> for EngineError {
    fn from(source: ValidationError) -> Self {
        Self::Validation { source }
    }
}
