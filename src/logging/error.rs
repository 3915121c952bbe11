//! Error types for logger setup and sink writes

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failure to initialize the logger
///
/// Cloneable so every caller waiting on the same initialization attempt
/// receives the same error.
#[derive(Debug, Clone, Error)]
pub enum InitError {
    #[error("cannot create log directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("log file base path {} has no file name", .0.display())]
    InvalidBasePath(PathBuf),
}

/// Failure of a single sink to accept a record
#[derive(Debug, Error)]
pub enum SinkError {
    /// Opening the file for a new day failed
    #[error("failed to open log file {}: {source}", path.display())]
    Rotation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write to {sink} sink: {source}")]
    Write {
        sink: String,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    pub(crate) fn write(sink: &str, source: io::Error) -> Self {
        SinkError::Write {
            sink: sink.to_string(),
            source,
        }
    }
}
