//! Record the current workspace as a named snapshot.

use super::Orchestrator;
use crate::workspace::Workspace;
use mrsnap_core::errors::Result;
use mrsnap_core::{
    dedup_last_wins, log_op_end, log_op_error, log_op_start, parse_manifest, Project, SnapshotKey,
};
use mrsnap_core_types::RunId;
use mrsnap_store::{AddOutcome, SnapshotCache};
use std::path::Path;
use std::time::Instant;

/// Summary of a record run
#[derive(Debug, Clone, PartialEq)]
pub struct RecordReport {
    pub key: SnapshotKey,
    /// Entries newly written
    pub recorded: usize,
    /// Entries that already held the local commit
    pub unchanged: usize,
    /// Projects without a working tree, skipped
    pub missing: Vec<String>,
}

impl<'a> Orchestrator<'a> {
    /// Store every project's checked-out commit under `Named(name)`
    ///
    /// An existing entry holding a different commit is a `CacheConflict`;
    /// entries recorded before it stay saved.
    pub fn record_snapshot(&self, workspace_root: &Path, name: &str) -> Result<RecordReport> {
        let run_id = RunId::new();
        let span = tracing::info_span!("record_snapshot", run_id = %run_id);
        let _guard = span.enter();

        let start = Instant::now();
        log_op_start!("record_snapshot", workspace = %workspace_root.display(), name);

        let result = self.record_inner(workspace_root, name);
        match &result {
            Ok(report) => {
                log_op_end!(
                    "record_snapshot",
                    duration_ms = start.elapsed().as_millis() as u64,
                    recorded = report.recorded as u64,
                    missing = report.missing.len() as u64
                );
            }
            Err(err) => {
                log_op_error!(
                    "record_snapshot",
                    err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
            }
        }
        result
    }

    fn record_inner(&self, workspace_root: &Path, name: &str) -> Result<RecordReport> {
        let settings = self.settings;
        let key = SnapshotKey::named(name)?;

        let workspace = Workspace::open(workspace_root)?;
        workspace.require_initialized()?;

        let cache_path = workspace.cache_path();
        let mut cache = SnapshotCache::load(&cache_path, &key)?;

        let mut projects = vec![Project::new(
            settings.manifest_project.as_str(),
            settings.manifest_dir.as_str(),
        )];
        let manifest_root = workspace.project_dir(&settings.manifest_dir);
        projects.extend(dedup_last_wins(&parse_manifest(
            &manifest_root,
            &settings.manifest_file,
        )?));

        let mut report = RecordReport {
            key: key.clone(),
            recorded: 0,
            unchanged: 0,
            missing: Vec::new(),
        };

        for project in &projects {
            let head = self.vcs.head(&workspace.project_dir(&project.path))?;
            let Some(commit) = head else {
                tracing::warn!(
                    project = project.name.as_str(),
                    path = project.path.as_str(),
                    "no working tree, skipping"
                );
                report.missing.push(project.name.clone());
                continue;
            };

            match cache.add(&commit, &key, &project.name, &project.path) {
                Ok(AddOutcome::Inserted) => {
                    cache.save(&cache_path)?;
                    report.recorded += 1;
                }
                Ok(AddOutcome::Unchanged) => report.unchanged += 1,
                Err(err) => {
                    cache.save(&cache_path)?;
                    return Err(err);
                }
            }
        }

        cache.save(&cache_path)?;
        Ok(report)
    }
}
