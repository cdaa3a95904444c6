//! Cache directory types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A file in the cache root, rebuilt on every scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub name: String,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

impl CacheEntry {
    /// Size for display, e.g. `"1.50 MB"`
    pub fn size_display(&self) -> String {
        format_size_mb(self.size_bytes)
    }
}

/// Format a byte count as megabytes with two decimals
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

/// Outcome of a single normalization sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub renamed: usize,
    pub already_canonical: usize,
    /// Entries that disappeared between listing and rename
    pub vanished: usize,
    pub warnings: Vec<String>,
}

/// Per-entry failure from a delete sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFailure {
    pub name: String,
    pub error: String,
}

/// Result of a delete-all sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    pub deleted: usize,
    pub failures: Vec<DeleteFailure>,
}

impl DeleteSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A resolved, existing regular file ready to be streamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub size: u64,
}
