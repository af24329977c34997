//! API error primitives.
//!
//! # Design
//! - Constant-message errors with structured context fields.
//! - Response bodies are redacted before they are captured, so variants are
//!   safe to log as-is.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for push zone API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors produced by the push zone API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable credentials could be resolved.
    #[error("push zone credentials are not configured")]
    MissingCredentials,
    /// The rolling-window call quota is exhausted.
    #[error("api rate limit exceeded")]
    RateLimited,
    /// The local file to push does not exist.
    #[error("local file is missing")]
    FileMissing {
        /// Path that could not be found.
        path: PathBuf,
    },
    /// Reading the local file failed.
    #[error("failed to read local file")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The file extension has no known upload content type.
    #[error("no content type known for file")]
    UnknownContentType {
        /// Path whose extension is unmapped.
        path: PathBuf,
    },
    /// Building the request endpoint failed.
    #[error("invalid endpoint url")]
    Endpoint {
        /// Operation whose endpoint failed to build.
        operation: &'static str,
        /// Underlying URL parse error.
        source: url::ParseError,
    },
    /// The HTTP transport failed (connect, timeout, body).
    #[error("api transport failure")]
    Transport {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying transport error.
        source: reqwest::Error,
    },
    /// The remote replied with a non-200 status.
    #[error("unexpected api response status")]
    Status {
        /// Operation that failed.
        operation: &'static str,
        /// HTTP status code returned.
        status: u16,
        /// Redacted response body excerpt.
        body: String,
    },
}

impl ApiError {
    pub(crate) fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_variant_preserves_source() {
        let err = ApiError::Io {
            path: PathBuf::from("/tmp/missing"),
            source: io::Error::other("io"),
        };
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "failed to read local file");
    }

    #[test]
    fn status_variant_is_constant_message() {
        let err = ApiError::Status {
            operation: "push_file",
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "unexpected api response status");
    }
}
