//! Cache-then-remote commit resolution with bounded concurrency
//!
//! The driving loop owns the cache: lookups run concurrently but only the
//! loop mutates and saves it, so every newly resolved project is flushed
//! before the next result is handled.

use futures::stream::{FuturesUnordered, StreamExt};
use mrsnap_core::errors::{ExError, Result, SnapError};
use mrsnap_core::{log_op_end, log_op_error, log_op_start, Project, SnapshotKey, TimeWindow};
use mrsnap_remote::{CommitLookup, CommitSource};
use mrsnap_store::SnapshotCache;
use std::path::Path;
use std::time::Instant;

/// Where the commits of one resolution pass came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ResolveStats {
    pub from_cache: usize,
    pub from_remote: usize,
}

/// Make sure every project in `projects` has a commit under `key`
///
/// Cached entries are reused. Misses are looked up on `source`, at most
/// `jobs` at a time, and each hit is added and saved immediately. A named
/// key never consults the remote: a miss fails straight away.
///
/// On the first failed lookup no further lookups are started, the ones in
/// flight are drained (their hits are kept), the cache is saved and the
/// first failure is returned.
pub(crate) async fn resolve_projects(
    cache: &mut SnapshotCache,
    cache_path: &Path,
    key: &SnapshotKey,
    projects: &[Project],
    source: &dyn CommitSource,
    jobs: usize,
) -> Result<ResolveStats> {
    let start = Instant::now();
    log_op_start!(
        "resolve_projects",
        snapshot_key = %key,
        project_count = projects.len() as u64
    );

    let result = resolve_inner(cache, cache_path, key, projects, source, jobs).await;
    match &result {
        Ok(stats) => {
            log_op_end!(
                "resolve_projects",
                duration_ms = start.elapsed().as_millis() as u64,
                snapshot_key = %key,
                from_cache = stats.from_cache as u64,
                from_remote = stats.from_remote as u64
            );
        }
        Err(err) => {
            log_op_error!(
                "resolve_projects",
                err,
                duration_ms = start.elapsed().as_millis() as u64,
                snapshot_key = %key
            );
        }
    }
    result
}

async fn resolve_inner(
    cache: &mut SnapshotCache,
    cache_path: &Path,
    key: &SnapshotKey,
    projects: &[Project],
    source: &dyn CommitSource,
    jobs: usize,
) -> Result<ResolveStats> {
    cache.ensure_bucket(key);

    let misses: Vec<&Project> = projects
        .iter()
        .filter(|p| cache.get(key, &p.name).is_none())
        .collect();
    let mut stats = ResolveStats {
        from_cache: projects.len() - misses.len(),
        from_remote: 0,
    };
    if misses.is_empty() {
        return Ok(stats);
    }

    let window = match key {
        SnapshotKey::Range(window) => window,
        SnapshotKey::Named(_) => {
            return Err(SnapError::NamedEntryMissing {
                project: misses[0].name.clone(),
                key: key.to_string(),
            }
            .into());
        }
    };

    let mut pending = misses.into_iter();
    let mut in_flight = FuturesUnordered::new();
    let mut failure: Option<ExError> = None;

    loop {
        while failure.is_none() && in_flight.len() < jobs.max(1) {
            match pending.next() {
                Some(project) => in_flight.push(lookup(source, project, window)),
                None => break,
            }
        }

        let Some((project, answer)) = in_flight.next().await else {
            break;
        };

        let outcome = match answer {
            CommitLookup::Found(commit) => cache
                .add(&commit, key, &project.name, &project.path)
                .and_then(|_| cache.save(cache_path))
                .map(|_| {
                    tracing::info!(
                        project = project.name.as_str(),
                        commit = commit.as_str(),
                        snapshot_key = %key,
                        "resolved"
                    );
                }),
            CommitLookup::Empty => Err(SnapError::NoCommitInWindow {
                project: project.name.clone(),
                key: key.to_string(),
            }
            .into()),
            CommitLookup::Unexpected(detail) => Err(SnapError::ProviderUnexpected {
                project: project.name.clone(),
                detail,
            }
            .into()),
        };

        match outcome {
            Ok(()) => stats.from_remote += 1,
            Err(err) => {
                if failure.is_none() {
                    failure = Some(err);
                } else {
                    tracing::warn!(
                        project = project.name.as_str(),
                        error = %err,
                        "further failure while draining lookups"
                    );
                }
            }
        }
    }

    match failure {
        Some(err) => {
            cache.save(cache_path)?;
            Err(err)
        }
        None => Ok(stats),
    }
}

async fn lookup<'a>(
    source: &'a dyn CommitSource,
    project: &'a Project,
    window: &'a TimeWindow,
) -> (&'a Project, CommitLookup) {
    let result = source.latest_commit(&project.name, window).await;
    (project, result)
}
