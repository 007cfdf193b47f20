//! Error types for fileops-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for the fileops library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input path or archive does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Destination exists and overwriting was not requested
    #[error("Target already exists: {} (set overwrite to replace it)", .0.display())]
    AlreadyExists(PathBuf),

    /// Extraction target has entries and overwriting was not requested
    #[error("Target directory is not empty: {} (set overwrite to extract anyway)", .0.display())]
    TargetNotEmpty(PathBuf),

    /// Unrecognized archive or document suffix
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Malformed page or range specification
    #[error("Invalid range \"{spec}\": {reason}")]
    InvalidRangeSyntax { spec: String, reason: String },

    /// Path has the wrong shape for the requested operation
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Argument outside its accepted domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure while producing an archive
    #[error("Archive write error: {0}")]
    ArchiveWrite(String),

    /// Failure while reading or unpacking an archive
    #[error("Archive read error: {0}")]
    ArchiveRead(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn range(spec: &str, reason: impl Into<String>) -> Self {
        Error::InvalidRangeSyntax {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::Io(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
