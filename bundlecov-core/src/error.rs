//! Typed error handling for bundlecov.
//!
//! Provides structured errors that library consumers can match on,
//! with full context about what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bundlecov operations.
///
/// Reconciliation and aggregation never fail; these errors come from the
/// collaborators around them (profile reading, bundle parsing, configuration).
#[derive(Error, Debug)]
pub enum BundlecovError {
    /// I/O error when reading files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Malformed coverage profile JSON
    #[error("Invalid coverage profile {path}: {message}")]
    Json {
        path: PathBuf,
        message: String,
        /// Line number (1-indexed) if available
        line: Option<usize>,
        /// Column number (1-indexed) if available
        column: Option<usize>,
    },

    /// Syntax error when parsing a JavaScript bundle
    #[error("Parse error in {asset}: {message}")]
    Parse { asset: String, message: String },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl BundlecovError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a profile error from a serde_json failure, keeping its location.
    pub fn json(path: impl Into<PathBuf>, err: &serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            message: err.to_string(),
            line: Some(err.line()).filter(|l| *l > 0),
            column: Some(err.column()).filter(|c| *c > 0),
        }
    }

    /// Create a bundle parse error for the given asset URL.
    pub fn parse(asset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            asset: asset.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error.
    ///
    /// A bad bundle only costs its own asset and a bad config falls back to
    /// defaults; everything else aborts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Config { .. })
    }
}

/// Convenience type alias for bundlecov results.
pub type BundlecovResult<T> = Result<T, BundlecovError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> BundlecovResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> BundlecovResult<T> {
        self.map_err(|e| BundlecovError::io(path, e))
    }
}
