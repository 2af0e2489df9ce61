//! Registry Error Types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the engine registry and its stores
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Invalid engine record: {0}")]
    Validation(String),

    #[error("Cannot decode engine entry: {0}")]
    DecodeFailure(String),

    #[error("Engine identifier already registered: {0}")]
    DuplicateIdentifier(String),

    #[error("Engine not found: {0}")]
    NotFound(String),

    #[error("Index {index} out of range ({len} engines)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration file not found: {path}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    #[error("No audio engines found in {path}")]
    NoEngines { path: PathBuf },

    #[error("Configuration template unavailable: {0}")]
    TemplateUnavailable(String),

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt preset archive {path}: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },
}

impl HubError {
    /// Classify a failed read of a document that must exist
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            HubError::FileNotFound { path, source }
        } else {
            HubError::ReadFailed { path, source }
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HubError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for registry operations
pub type HubResult<T> = Result<T, HubError>;
