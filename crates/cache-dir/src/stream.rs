//! Lookup of a single entry for streaming

use crate::error::{CacheDirError, Result};
use crate::path;
use crate::types::ImageFile;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Resolve `raw` to an existing regular file inside `root`.
///
/// Does not take the root lock. A file removed by a concurrent delete simply
/// reports `NotFound`.
pub async fn open(root: &Path, raw: &str) -> Result<ImageFile> {
    let target = path::resolve(root, raw)?;

    match fs::metadata(&target).await {
        Ok(meta) if meta.is_file() => Ok(ImageFile {
            path: target,
            size: meta.len(),
        }),
        Ok(_) => Err(CacheDirError::NotFound(raw.to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(CacheDirError::NotFound(raw.to_string())),
        Err(e) => Err(e.into()),
    }
}
