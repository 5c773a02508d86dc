use std::path::PathBuf;

use cssutils::CssError;
use thiserror::Error;

/// Failure of a single file operation.
///
/// Callers only distinguish "not found" from everything else: a missing
/// file is evicted from the cache, any other failure forces a reparse.
#[derive(Error, Debug)]
pub enum FsError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl FsError {
    /// Classifies an I/O error for `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            FsError::NotFound(path)
        } else {
            FsError::Io { path, source }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}

/// The project file list could not be produced.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("file index unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Fs(#[from] FsError),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to enumerate project files: {0}")]
    Index(#[from] IndexError),

    #[error("invalid query: {0}")]
    Query(#[from] CssError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
