//! Containment checks for client-supplied names.
//!
//! Every operation that accepts a name from outside resolves it here first.
//! A name is rejected when it is empty, absolute, contains a NUL byte, or
//! climbs above the cache root with `..`. The joined path, or its deepest
//! existing ancestor when it does not exist yet, is canonicalized so a
//! symlink pointing outside the root is also rejected.

use crate::error::{CacheDirError, Result};
use std::path::{Component, Path, PathBuf};

/// Resolve `raw` against `root`, returning an absolute path inside `root`.
///
/// A path that does not exist keeps its lexical form, so the caller reports
/// `NotFound` instead of `InvalidPath` for names that are merely missing.
/// Its deepest existing ancestor must still canonicalize inside the root.
pub fn resolve(root: &Path, raw: &str) -> Result<PathBuf> {
    let invalid = || CacheDirError::InvalidPath(raw.to_string());
    let relative = lexical(raw)?;
    let joined = root.join(&relative);

    // Nothing under a missing root can exist, so nothing can escape through it
    let Ok(canonical_root) = root.canonicalize() else {
        return Ok(joined);
    };

    if let Ok(target) = joined.canonicalize() {
        return if target.starts_with(&canonical_root) && target != canonical_root {
            Ok(joined)
        } else {
            Err(invalid())
        };
    }

    let mut ancestor = joined.parent();
    while let Some(dir) = ancestor {
        if let Ok(canonical) = dir.canonicalize() {
            return if canonical.starts_with(&canonical_root) {
                Ok(joined)
            } else {
                Err(invalid())
            };
        }
        ancestor = dir.parent();
    }
    Ok(joined)
}

/// Normalize `raw` into a relative path without touching the filesystem.
fn lexical(raw: &str) -> Result<PathBuf> {
    let invalid = || CacheDirError::InvalidPath(raw.to_string());

    if raw.is_empty() || raw.contains('\0') {
        return Err(invalid());
    }

    let mut components = Vec::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(s) => components.push(s),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(invalid()),
            Component::ParentDir => {
                if components.pop().is_none() {
                    return Err(invalid());
                }
            }
        }
    }

    if components.is_empty() {
        return Err(invalid());
    }
    Ok(components.into_iter().collect())
}
