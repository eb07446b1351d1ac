//! Download a workspace at a snapshot.
//!
//! ## Pipeline (in order):
//! 1. Workspace ready: create the root if missing, refuse non-directories
//! 2. Initialise the super-repo if `.repo` is absent
//! 3. Pin the manifest repository (only with a key)
//! 4. Bulk sync (unless `no_sync`)
//! 5. Resolve every manifest project (only with a key)
//! 6. Check every project out, in manifest order
//! 7. Post steps (unless `skip_post_steps`)
//!
//! The cache is saved after every newly resolved project and again when
//! checkout completes or aborts. Nothing is rolled back.

use super::Orchestrator;
use crate::resolve::resolve_projects;
use crate::workspace::Workspace;
use mrsnap_core::errors::{ExError, ExErrorKind, Result, SnapError};
use mrsnap_core::{
    dedup_last_wins, log_op_end, log_op_error, log_op_start, parse_manifest, Project, SnapshotKey,
};
use mrsnap_core_types::RunId;
use mrsnap_store::SnapshotCache;
use mrsnap_vcs::CheckoutDriver;
use std::path::Path;
use std::time::Instant;
use tracing::Instrument;

/// What to download
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadRequest {
    /// Snapshot to pin; `None` syncs to whatever the manifest declares
    pub key: Option<SnapshotKey>,
    pub no_sync: bool,
    pub skip_post_steps: bool,
}

/// Summary of a completed download
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadReport {
    pub key: Option<SnapshotKey>,
    /// Commit the manifest repository was pinned to
    pub manifest_commit: Option<String>,
    pub resolved_from_cache: usize,
    pub resolved_from_remote: usize,
    pub checked_out: usize,
    pub post_steps_run: usize,
}

impl<'a> Orchestrator<'a> {
    /// Bring `workspace_root` to the state described by `request`
    pub async fn download(
        &self,
        workspace_root: &Path,
        request: &DownloadRequest,
    ) -> Result<DownloadReport> {
        let run_id = RunId::new();
        let span = tracing::info_span!("download", run_id = %run_id);

        async {
            let start = Instant::now();
            log_op_start!("download", workspace = %workspace_root.display());

            let result = self.download_inner(workspace_root, request).await;
            match &result {
                Ok(report) => {
                    log_op_end!(
                        "download",
                        duration_ms = start.elapsed().as_millis() as u64,
                        checked_out = report.checked_out as u64,
                        post_steps_run = report.post_steps_run as u64
                    );
                }
                Err(err) => {
                    log_op_error!(
                        "download",
                        err,
                        duration_ms = start.elapsed().as_millis() as u64
                    );
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn download_inner(
        &self,
        workspace_root: &Path,
        request: &DownloadRequest,
    ) -> Result<DownloadReport> {
        let settings = self.settings;
        let mut report = DownloadReport {
            key: request.key.clone(),
            ..DownloadReport::default()
        };

        let workspace = Workspace::prepare(workspace_root)?;

        if !workspace.is_initialized() {
            self.runner.run(&settings.init_command, workspace.root())?;
        }

        let cache_path = workspace.cache_path();
        let mut pinned = match &request.key {
            Some(key) => {
                let mut cache = SnapshotCache::load(&cache_path, key)?;
                let commit = self
                    .pin_manifest(&workspace, &mut cache, &cache_path, key)
                    .await?;
                report.manifest_commit = Some(commit);
                Some(cache)
            }
            None => None,
        };

        if !request.no_sync {
            self.runner.run(&settings.sync_command, workspace.root())?;
        }

        if let (Some(key), Some(cache)) = (&request.key, pinned.as_mut()) {
            let projects = self.manifest_projects(&workspace)?;
            let stats = resolve_projects(
                cache,
                &cache_path,
                key,
                &projects,
                self.source,
                settings.jobs,
            )
            .await?;
            report.resolved_from_cache = stats.from_cache;
            report.resolved_from_remote = stats.from_remote;

            report.checked_out =
                self.check_out_all(&workspace, cache, &cache_path, key, &projects)?;
        }

        if !request.skip_post_steps {
            let total = settings.post_steps.len();
            for (index, step) in settings.post_steps.iter().enumerate() {
                self.runner.run(step, workspace.root()).map_err(|err| {
                    ExError::new(err.kind())
                        .with_op("post_step")
                        .with_command(step.to_string())
                        .with_message(format!("post step {} of {} failed", index + 1, total))
                        .with_source(err)
                })?;
                report.post_steps_run += 1;
            }
        }

        Ok(report)
    }

    /// Resolve and check out the manifest repository itself
    async fn pin_manifest(
        &self,
        workspace: &Workspace,
        cache: &mut SnapshotCache,
        cache_path: &Path,
        key: &SnapshotKey,
    ) -> Result<String> {
        let settings = self.settings;
        let manifest = Project::new(
            settings.manifest_project.as_str(),
            settings.manifest_dir.as_str(),
        );

        resolve_projects(
            cache,
            cache_path,
            key,
            std::slice::from_ref(&manifest),
            self.source,
            1,
        )
        .await?;
        let commit = cached_commit(cache, key, &manifest)?;

        let driver = CheckoutDriver::new(self.vcs);
        if !driver.apply(&workspace.project_dir(&manifest.path), &commit) {
            cache.save(cache_path)?;
            return Err(SnapError::CheckoutFailed {
                path: manifest.path.clone(),
                commit,
            }
            .into());
        }
        Ok(commit)
    }

    fn manifest_projects(&self, workspace: &Workspace) -> Result<Vec<Project>> {
        let settings = self.settings;
        let manifest_root = workspace.project_dir(&settings.manifest_dir);
        let projects = parse_manifest(&manifest_root, &settings.manifest_file)?;
        Ok(dedup_last_wins(&projects))
    }

    /// Sequential checkout; the first failure stops the loop
    fn check_out_all(
        &self,
        workspace: &Workspace,
        cache: &SnapshotCache,
        cache_path: &Path,
        key: &SnapshotKey,
        projects: &[Project],
    ) -> Result<usize> {
        let driver = CheckoutDriver::new(self.vcs);
        let mut checked_out = 0;

        for project in projects {
            let commit = cached_commit(cache, key, project)?;
            if !driver.apply(&workspace.project_dir(&project.path), &commit) {
                cache.save(cache_path)?;
                return Err(ExError::from(SnapError::CheckoutFailed {
                    path: project.path.clone(),
                    commit,
                })
                .with_project(project.name.as_str())
                .with_snapshot_key(key.to_string()));
            }
            checked_out += 1;
        }

        cache.save(cache_path)?;
        Ok(checked_out)
    }
}

fn cached_commit(cache: &SnapshotCache, key: &SnapshotKey, project: &Project) -> Result<String> {
    cache
        .get(key, &project.name)
        .map(str::to_string)
        .ok_or_else(|| {
            ExError::new(ExErrorKind::Internal)
                .with_op("checkout")
                .with_project(project.name.as_str())
                .with_snapshot_key(key.to_string())
                .with_message("project was resolved but has no cache entry")
        })
}
