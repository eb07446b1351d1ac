//! mrsnap Core - domain model, manifest parsing and shared facilities
//!
//! This crate provides the pieces every other mrsnap crate builds on:
//! - Structured error facility (`ExError`, `ExErrorKind`) and domain errors (`SnapError`)
//! - Logging facility with canonical `log_op_*` macros
//! - Domain model: projects, time windows and tagged snapshot keys
//! - Recursive manifest parser for `repo`-style XML manifests

pub mod errors;
pub mod logging_facility;
pub mod manifest;
pub mod model;

pub use mrsnap_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, SnapError};
pub use manifest::parse_manifest;
pub use model::{dedup_last_wins, index_by_name, CommitRecord, Project, SnapshotKey, TimeWindow};
