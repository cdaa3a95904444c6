//! Deletion of single entries and whole-directory sweeps.
//!
//! Both functions expect the caller to hold the root lock.

use crate::error::{CacheDirError, Result};
use crate::path;
use crate::types::{DeleteFailure, DeleteSummary};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

/// Remove exactly one file named `raw` from `root`.
///
/// A name that is already gone yields `NotFound`; any other removal error is
/// `DeleteFailed`.
pub async fn delete_one(root: &Path, raw: &str) -> Result<()> {
    let target = path::resolve(root, raw)?;

    match fs::symlink_metadata(&target).await {
        Ok(meta) if meta.is_dir() => return Err(CacheDirError::NotFound(raw.to_string())),
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CacheDirError::NotFound(raw.to_string()))
        }
        Err(e) => {
            return Err(CacheDirError::DeleteFailed {
                reason: format!("{}: {}", raw, e),
                summary: None,
            })
        }
    }

    match fs::remove_file(&target).await {
        Ok(()) => {
            debug!(path = ?target, "Deleted cache entry");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(CacheDirError::NotFound(raw.to_string())),
        Err(e) => {
            warn!(path = ?target, error = %e, "Error deleting file");
            Err(CacheDirError::DeleteFailed {
                reason: format!("{}: {}", raw, e),
                summary: None,
            })
        }
    }
}

/// Remove every non-directory entry in `root`.
///
/// One failing entry does not stop the sweep. If anything could not be
/// removed the call returns `DeleteFailed` carrying the full summary.
pub async fn delete_all(root: &Path) -> Result<DeleteSummary> {
    let mut dir = fs::read_dir(root)
        .await
        .map_err(|e| CacheDirError::unreadable(root, e))?;

    let mut summary = DeleteSummary::default();
    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Err(CacheDirError::unreadable(root, e)),
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        match entry.file_type().await {
            Ok(ft) if ft.is_dir() => continue,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                summary.failures.push(DeleteFailure {
                    name,
                    error: e.to_string(),
                });
                continue;
            }
        }

        match fs::remove_file(entry.path()).await {
            Ok(()) => summary.deleted += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Error deleting file");
                summary.failures.push(DeleteFailure {
                    name,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        deleted = summary.deleted,
        failed = summary.failures.len(),
        "Cache sweep finished"
    );

    if summary.is_complete() {
        Ok(summary)
    } else {
        Err(CacheDirError::DeleteFailed {
            reason: format!("{} entries could not be removed", summary.failures.len()),
            summary: Some(summary),
        })
    }
}
