//! Directory listing into `CacheEntry` records

use crate::error::{CacheDirError, Result};
use crate::normalize::is_canonical;
use crate::types::CacheEntry;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Read every canonical, non-directory entry in `root`.
///
/// Per-file stat failures are logged and skipped. Entries the normalizer
/// could not rename are left out so every returned name is canonical.
pub async fn scan(root: &Path) -> Result<Vec<CacheEntry>> {
    let mut dir = fs::read_dir(root)
        .await
        .map_err(|e| CacheDirError::unreadable(root, e))?;

    let mut entries = Vec::new();
    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Err(CacheDirError::unreadable(root, e)),
        };

        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !is_canonical(&name) {
            debug!(name = %name, "Skipping non-canonical entry");
            continue;
        }

        // Follow symlinks so a link to a directory is not listed as an image
        let metadata = match fs::metadata(entry.path()).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Error getting file info");
                continue;
            }
        };
        if metadata.is_dir() {
            continue;
        }

        let modified_at = match metadata.modified() {
            Ok(time) => DateTime::<Utc>::from(time),
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Modification time unavailable");
                continue;
            }
        };

        entries.push(CacheEntry {
            name,
            modified_at,
            size_bytes: metadata.len(),
        });
    }

    sort_entries(&mut entries);
    Ok(entries)
}

/// Most recently modified first, ties broken by name ascending
pub fn sort_entries(entries: &mut [CacheEntry]) {
    entries.sort_by(|a, b| match b.modified_at.cmp(&a.modified_at) {
        Ordering::Equal => a.name.cmp(&b.name),
        other => other,
    });
}
