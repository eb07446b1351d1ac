//! In-memory snapshot cache with wholesale persistence

use crate::cache::atomic::atomic_write;
use crate::cache::format::{Buckets, CacheFile, CacheFileRef, SCHEMA_VERSION};
use crate::errors::{cache_corrupt, io_error, serialization_error, Result};
use mrsnap_core::errors::SnapError;
use mrsnap_core::{log_op_end, log_op_error, log_op_start, CommitRecord, SnapshotKey};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Cache file name under the workspace root
pub const CACHE_FILE_NAME: &str = ".sha_cache.json";

/// Project name → resolved commit, for one snapshot key
pub type Bucket = BTreeMap<String, CommitRecord>;

/// Result of `SnapshotCache::add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new entry was written
    Inserted,
    /// The entry already held this commit
    Unchanged,
}

/// Snapshot key → project → commit record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotCache {
    snapshots: Buckets,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Location of the cache file inside a workspace
    pub fn path_in(workspace_root: &Path) -> PathBuf {
        workspace_root.join(CACHE_FILE_NAME)
    }

    /// Load the cache file (if present) and make sure `key` has a bucket
    ///
    /// A file that exists but is not a valid cache is `CacheCorrupt`; it is
    /// never silently discarded.
    pub fn load(path: &Path, key: &SnapshotKey) -> Result<Self> {
        let mut cache = Self::read(path)?;
        cache.ensure_bucket(key);
        Ok(cache)
    }

    /// Load the cache file as-is, without creating any bucket
    pub fn read(path: &Path) -> Result<Self> {
        let start = Instant::now();
        log_op_start!("cache_load", path = %path.display());

        match Self::read_inner(path) {
            Ok(cache) => {
                log_op_end!(
                    "cache_load",
                    duration_ms = start.elapsed().as_millis() as u64,
                    snapshot_count = cache.snapshots.len() as u64
                );
                Ok(cache)
            }
            Err(err) => {
                log_op_error!(
                    "cache_load",
                    &err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    fn read_inner(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        if !path.is_file() {
            return Err(cache_corrupt(path, "cache path exists but is not a file"));
        }

        let bytes = fs::read(path).map_err(|e| io_error("cache_read", path, e))?;
        let file: CacheFile = serde_json::from_slice(&bytes)
            .map_err(|e| cache_corrupt(path, format!("unreadable cache file: {}", e)))?;

        if file.schema_version != SCHEMA_VERSION {
            return Err(cache_corrupt(
                path,
                format!(
                    "unsupported schema_version {} (expected {})",
                    file.schema_version, SCHEMA_VERSION
                ),
            ));
        }

        for (key, bucket) in &file.snapshots {
            for (project, record) in bucket {
                if project.is_empty() || record.commit.trim().is_empty() {
                    return Err(cache_corrupt(
                        path,
                        format!("empty project or commit under {}", key),
                    ));
                }
            }
        }

        Ok(Self {
            snapshots: file.snapshots,
        })
    }

    /// Create an empty bucket for `key` if it has none
    pub fn ensure_bucket(&mut self, key: &SnapshotKey) {
        self.snapshots.entry(key.clone()).or_default();
    }

    /// Look up the commit recorded for `project` under `key`
    ///
    /// `key` must have been loaded first.
    pub fn get(&self, key: &SnapshotKey, project: &str) -> Option<&str> {
        let bucket = self.snapshots.get(key);
        debug_assert!(bucket.is_some(), "snapshot key {} was never loaded", key);
        bucket
            .and_then(|b| b.get(project))
            .map(|r| r.commit.as_str())
    }

    /// Record `commit` for `project_name` under `key`
    ///
    /// An existing entry is never replaced by a different commit; that is a
    /// `CacheConflict` and leaves the cache untouched. Re-adding the same
    /// commit refreshes the recorded path.
    pub fn add(
        &mut self,
        commit: &str,
        key: &SnapshotKey,
        project_name: &str,
        project_path: &str,
    ) -> Result<AddOutcome> {
        let bucket = self.snapshots.entry(key.clone()).or_default();
        let record = CommitRecord::new(project_path, commit);

        let outcome = match bucket.get(project_name) {
            Some(existing) if existing.commit != commit => {
                return Err(SnapError::CacheConflict {
                    key: key.to_string(),
                    project: project_name.to_string(),
                    existing: existing.commit.clone(),
                    attempted: commit.to_string(),
                }
                .into());
            }
            Some(_) => AddOutcome::Unchanged,
            None => AddOutcome::Inserted,
        };
        bucket.insert(project_name.to_string(), record);
        Ok(outcome)
    }

    /// Write every bucket back to `path`, replacing the file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = CacheFileRef {
            schema_version: SCHEMA_VERSION,
            snapshots: &self.snapshots,
        };
        let mut bytes = serde_json::to_vec_pretty(&file).map_err(serialization_error)?;
        bytes.push(b'\n');
        atomic_write(path, &bytes)?;

        tracing::debug!(
            path = %path.display(),
            snapshot_count = self.snapshots.len() as u64,
            "saved snapshot cache"
        );
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &SnapshotKey> {
        self.snapshots.keys()
    }

    pub fn bucket(&self, key: &SnapshotKey) -> Option<&Bucket> {
        self.snapshots.get(key)
    }

    /// Number of snapshot keys held
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
