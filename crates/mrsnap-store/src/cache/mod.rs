//! Snapshot cache
//!
//! Provides:
//! - In-memory buckets keyed by `SnapshotKey`
//! - No-overwrite invariant per (key, project)
//! - Versioned JSON file format with validation on load
//! - Atomic writes

mod atomic;
mod format;
mod snapshot_cache;

pub use snapshot_cache::{AddOutcome, Bucket, SnapshotCache, CACHE_FILE_NAME};
