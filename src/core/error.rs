//! Error types and error handling for docsift.
//!
//! This module defines the error taxonomy used throughout the
//! crate. Per-document conditions (empty document, keyword not
//! present) are ordinary variants so the batch runner can record
//! them in its report instead of aborting.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docsift operations
pub type Result<T> = std::result::Result<T, DocsiftError>;

/// Main error type for docsift
#[derive(Error, Debug)]
pub enum DocsiftError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("No extractable text in {0}")]
    EmptyDocument(String),

    #[error("No match found for '{keyword}'")]
    NoMatchFound { keyword: String },

    #[error("Output location {path:?} is not writable: {source}")]
    IoFatal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document reader failed: {0}")]
    ReaderFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl DocsiftError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this error was raised while validating a request,
    /// before any document was opened
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DocsiftError::Validation(_) | DocsiftError::ConfigError(_)
        )
    }

    /// Check if this is a per-document condition that must not
    /// abort a batch
    pub fn is_soft_failure(&self) -> bool {
        matches!(
            self,
            DocsiftError::EmptyDocument(_)
                | DocsiftError::NoMatchFound { .. }
                | DocsiftError::UnsupportedFormat(_)
                | DocsiftError::ReaderFailed(_)
        )
    }

    /// Check if this error stops the whole batch
    pub fn is_fatal(&self) -> bool {
        matches!(self, DocsiftError::IoFatal { .. })
    }

    /// Build an `IoFatal` for the given output location
    pub fn io_fatal(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocsiftError::IoFatal {
            path: path.into(),
            source,
        }
    }
}
