//! In-place renaming of raw cache files to the canonical suffix

use crate::error::{CacheDirError, Result};
use crate::types::NormalizeReport;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Suffix every listed entry carries after normalization
pub const CANONICAL_SUFFIX: &str = ".png";

pub fn is_canonical(name: &str) -> bool {
    name.ends_with(CANONICAL_SUFFIX)
}

/// Canonical form of `name`. Already-canonical names are returned unchanged.
pub fn canonical_name(name: &str) -> String {
    if is_canonical(name) {
        name.to_string()
    } else {
        format!("{}{}", name, CANONICAL_SUFFIX)
    }
}

/// Rename every non-directory entry in `root` that lacks the canonical suffix.
///
/// Each entry gets at most one rename attempt. Failures are collected as
/// warnings and the sweep carries on; only an unreadable root is fatal.
/// Callers must hold the root lock.
pub async fn normalize(root: &Path) -> Result<NormalizeReport> {
    let mut report = NormalizeReport::default();
    let mut dir = fs::read_dir(root)
        .await
        .map_err(|e| CacheDirError::unreadable(root, e))?;

    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Err(CacheDirError::unreadable(root, e)),
        };

        // Follow symlinks so a link to a directory is skipped like the directory
        match fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_dir() => continue,
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // A dangling symlink is still a file entry
                if !matches!(entry.file_type().await, Ok(ft) if ft.is_symlink()) {
                    report.vanished += 1;
                    continue;
                }
            }
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Failed to read file metadata");
                report.warnings.push(format!("{}: {}", entry.path().display(), e));
                continue;
            }
        }

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!(name = ?raw, "Skipping non UTF-8 file name");
                report.warnings.push(format!("{:?}: not valid UTF-8", raw));
                continue;
            }
        };

        match rename_entry(root, &name).await {
            RenameOutcome::Renamed => report.renamed += 1,
            RenameOutcome::AlreadyCanonical => report.already_canonical += 1,
            RenameOutcome::Vanished => report.vanished += 1,
            RenameOutcome::Skipped(warning) => report.warnings.push(warning),
        }
    }

    Ok(report)
}

#[derive(Debug, PartialEq, Eq)]
enum RenameOutcome {
    Renamed,
    AlreadyCanonical,
    /// Source disappeared, e.g. renamed by a concurrent sweep
    Vanished,
    Skipped(String),
}

/// Give the entry `name` in `root` the canonical suffix, attempting one rename.
async fn rename_entry(root: &Path, name: &str) -> RenameOutcome {
    if is_canonical(name) {
        return RenameOutcome::AlreadyCanonical;
    }

    let source = root.join(name);
    let target = root.join(canonical_name(name));

    // rename(2) silently replaces an existing target on unix
    match fs::try_exists(&target).await {
        Ok(false) => {}
        Ok(true) => {
            warn!(path = ?source, target = ?target, "Canonical name already taken, skipping");
            return RenameOutcome::Skipped(format!(
                "{}: target {} already exists",
                name,
                target.display()
            ));
        }
        Err(e) => {
            warn!(path = ?target, error = %e, "Failed to check rename target");
            return RenameOutcome::Skipped(format!("{}: {}", name, e));
        }
    }

    match fs::rename(&source, &target).await {
        Ok(()) => {
            debug!(from = ?source, to = ?target, "Renamed cache entry");
            RenameOutcome::Renamed
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = ?source, "Entry vanished before rename");
            RenameOutcome::Vanished
        }
        Err(e) => {
            warn!(path = ?source, error = %e, "Error renaming file");
            RenameOutcome::Skipped(format!("{}: {}", name, e))
        }
    }
}
