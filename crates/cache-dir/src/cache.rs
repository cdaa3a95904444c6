//! Shared handle over a single cache root

use crate::error::Result;
use crate::types::{CacheEntry, DeleteSummary, ImageFile, NormalizeReport};
use crate::{mutate, normalize, path, reveal, scan, stream};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A cache root plus the lock that serializes every rename and delete on it.
///
/// The directory itself is the only source of truth: nothing is indexed in
/// memory and every call re-reads the live directory. Renames and deletes
/// run under the root lock so a listing never sees a half-renamed directory
/// and a single delete never races a sweep. Lookups for streaming and
/// reveal stay lock-free.
pub struct CacheDir {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl CacheDir {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a client-supplied name to a path inside the root
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        path::resolve(&self.root, name)
    }

    /// Run one normalization sweep
    pub async fn normalize(&self) -> Result<NormalizeReport> {
        let _guard = self.write_lock.lock().await;
        self.normalize_locked().await
    }

    /// Normalize, then list every entry newest first
    pub async fn list(&self) -> Result<Vec<CacheEntry>> {
        let _guard = self.write_lock.lock().await;
        self.normalize_locked().await?;
        let entries = scan::scan(&self.root).await?;
        debug!(count = entries.len(), "Listed cache entries");
        Ok(entries)
    }

    pub async fn open(&self, name: &str) -> Result<ImageFile> {
        stream::open(&self.root, name).await
    }

    pub async fn delete_one(&self, name: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        mutate::delete_one(&self.root, name).await?;
        info!(name = %name, "Deleted cache entry");
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<DeleteSummary> {
        let _guard = self.write_lock.lock().await;
        mutate::delete_all(&self.root).await
    }

    pub fn reveal(&self, name: &str) -> Result<()> {
        reveal::reveal(&self.root, name)
    }

    async fn normalize_locked(&self) -> Result<NormalizeReport> {
        let report = normalize::normalize(&self.root).await?;
        if report.renamed > 0 || !report.warnings.is_empty() {
            info!(
                renamed = report.renamed,
                vanished = report.vanished,
                warnings = report.warnings.len(),
                "Normalized cache directory"
            );
        }
        for warning in &report.warnings {
            warn!(warning = %warning, "Normalization skipped an entry");
        }
        Ok(report)
    }
}
