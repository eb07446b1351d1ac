//! Command orchestration layer.
//!
//! `Orchestrator` ties the collaborators of a run together. Each command
//! lives in its own module as an `impl Orchestrator` block.

pub mod download;
pub mod record;

use crate::config::Settings;
use mrsnap_remote::CommitSource;
use mrsnap_vcs::{ToolRunner, Vcs};

/// Drives download and record runs over one set of collaborators
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    source: &'a dyn CommitSource,
    vcs: &'a dyn Vcs,
    runner: &'a dyn ToolRunner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: &'a Settings,
        source: &'a dyn CommitSource,
        vcs: &'a dyn Vcs,
        runner: &'a dyn ToolRunner,
    ) -> Self {
        Self {
            settings,
            source,
            vcs,
            runner,
        }
    }
}
