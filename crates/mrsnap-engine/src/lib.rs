//! mrsnap Engine - Orchestration layer
//!
//! Coordinates the manifest parser, commit sources, the snapshot cache and
//! the checkout driver into the two user-facing runs: downloading a
//! workspace at a snapshot, and recording the current workspace as a named
//! snapshot.

pub mod commands;
pub mod config;
pub mod workspace;

mod resolve;

pub use commands::download::{DownloadReport, DownloadRequest};
pub use commands::record::RecordReport;
pub use commands::Orchestrator;
pub use config::{Settings, CONFIG_FILE_NAME};
pub use workspace::Workspace;
