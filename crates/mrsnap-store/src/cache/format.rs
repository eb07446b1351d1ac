//! On-disk cache format, version 1
//!
//! ```json
//! { "schema_version": 1,
//!   "snapshots": { "range:*..2024-02-01": { "build": { "path": "build", "sha": "..." } } } }
//! ```

use mrsnap_core::{CommitRecord, SnapshotKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;

pub type Buckets = BTreeMap<SnapshotKey, BTreeMap<String, CommitRecord>>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheFile {
    pub schema_version: u32,
    pub snapshots: Buckets,
}

#[derive(Debug, Serialize)]
pub struct CacheFileRef<'a> {
    pub schema_version: u32,
    pub snapshots: &'a Buckets,
}
