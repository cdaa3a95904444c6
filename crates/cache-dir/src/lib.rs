//! Cache directory management
//!
//! Treats a directory of raw, extensionless blob files written by another
//! program as a collection of images. Names are normalized to a canonical
//! suffix, entries are listed with metadata, and single entries or the whole
//! directory can be deleted. Every client-supplied name goes through
//! [`path::resolve`] before the filesystem is touched.

mod cache;
mod error;
pub mod mutate;
pub mod normalize;
pub mod path;
pub mod reveal;
pub mod scan;
pub mod stream;
mod types;

pub use cache::CacheDir;
pub use error::{CacheDirError, Result};
pub use normalize::CANONICAL_SUFFIX;
pub use types::{
    format_size_mb, CacheEntry, DeleteFailure, DeleteSummary, ImageFile, NormalizeReport,
};
