//! Error types for cache directory operations

use crate::types::DeleteSummary;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum CacheDirError {
    /// Empty name, traversal, absolute path or symlink escaping the root
    InvalidPath(String),
    NotFound(String),
    DirectoryUnreadable {
        path: PathBuf,
        source: Box<std::io::Error>,
    },
    /// Single-file removal failure, or a sweep that left entries behind
    DeleteFailed {
        reason: String,
        summary: Option<DeleteSummary>,
    },
    UnsupportedPlatform(String),
    LaunchFailed(Box<std::io::Error>),
    Io(Box<std::io::Error>),
}

impl fmt::Display for CacheDirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheDirError::InvalidPath(name) => write!(f, "Invalid path: {:?}", name),
            CacheDirError::NotFound(name) => write!(f, "Not found: {}", name),
            CacheDirError::DirectoryUnreadable { path, source } => {
                write!(f, "Unable to read cache directory {}: {}", path.display(), source)
            }
            CacheDirError::DeleteFailed { reason, summary } => match summary {
                Some(summary) => write!(
                    f,
                    "Delete failed: {} ({} deleted, {} failed)",
                    reason,
                    summary.deleted,
                    summary.failures.len()
                ),
                None => write!(f, "Delete failed: {}", reason),
            },
            CacheDirError::UnsupportedPlatform(os) => {
                write!(f, "Unsupported operating system: {}", os)
            }
            CacheDirError::LaunchFailed(err) => {
                write!(f, "Unable to open file explorer: {}", err)
            }
            CacheDirError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CacheDirError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheDirError::DirectoryUnreadable { source, .. } => Some(source.as_ref()),
            CacheDirError::LaunchFailed(err) => Some(err.as_ref()),
            CacheDirError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheDirError {
    fn from(err: std::io::Error) -> Self {
        CacheDirError::Io(Box::new(err))
    }
}

impl CacheDirError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        CacheDirError::DirectoryUnreadable {
            path: path.into(),
            source: Box::new(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheDirError>;
