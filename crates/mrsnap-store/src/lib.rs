//! mrsnap Store - persistence for resolved snapshots
//!
//! Provides:
//! - The snapshot cache: snapshot key → project → resolved commit
//! - A schema-checked JSON file format validated on load
//! - Atomic temp→rename writes so a crash never truncates the cache

pub mod cache;
pub mod errors;

pub use cache::{AddOutcome, SnapshotCache, CACHE_FILE_NAME};
pub use errors::Result;
