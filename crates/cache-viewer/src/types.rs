//! Wire types for the cache viewer API

use cache_dir::CacheEntry;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

/// One image in the `/images` listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageInfo {
    pub name: String,
    /// RFC 3339 modification time
    pub timestamp: String,
    /// Display size, e.g. `"1.50 MB"`
    pub size: String,
}

impl From<&CacheEntry> for ImageInfo {
    fn from(entry: &CacheEntry) -> Self {
        Self {
            name: entry.name.clone(),
            timestamp: entry.modified_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            size: entry.size_display(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub total: usize,
    pub images: Vec<ImageInfo>,
}

/// Body of a fully successful `/delete-cache`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCacheResponse {
    pub total: usize,
}

/// `?path=` query for delete and reveal
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache_dir: String,
}
