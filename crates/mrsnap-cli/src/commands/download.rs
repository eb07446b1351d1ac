//! Download command

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use mrsnap_core::errors::{ExError, ExErrorKind};
use mrsnap_core::{SnapshotKey, TimeWindow};
use mrsnap_core_types::Sensitive;
use mrsnap_engine::{DownloadReport, DownloadRequest, Orchestrator, Settings};
use mrsnap_remote::{CommitSource, GiteeClient, OfflineSource};
use mrsnap_vcs::{GitCli, SystemRunner};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Workspace root; created when missing
    pub workspace: PathBuf,

    /// Access token for the commit history API
    #[arg(short = 'a', long, env = "MRSNAP_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Replay a snapshot recorded with `snapshot save`
    #[arg(long, conflicts_with_all = ["since", "until"])]
    pub entry: Option<String>,

    /// Start of the window (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// End of the window (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Skip the bulk sync
    #[arg(long)]
    pub no_sync: bool,

    /// Skip the post-checkout provisioning steps
    #[arg(long)]
    pub skip_post_steps: bool,

    /// Concurrent commit lookups
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Config file (defaults to <WORKSPACE>/mrsnap.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: DownloadArgs) -> Result<()> {
    let key = snapshot_key(&args)?;

    let mut settings = Settings::load(args.config.as_deref(), &args.workspace)?;
    if let Some(jobs) = args.jobs {
        settings.jobs = jobs;
        settings.validate()?;
    }

    let token = args.access_token.and_then(Sensitive::non_empty);
    let source: Box<dyn CommitSource> = match (&key, token) {
        (Some(SnapshotKey::Range(_)), Some(token)) => Box::new(GiteeClient::new(
            settings.api_base_url.as_str(),
            settings.organization.as_str(),
            token,
            settings.http_timeout(),
        )?),
        (Some(SnapshotKey::Range(_)), None) => {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("download")
                .with_message(
                    "an access token (--access-token or MRSNAP_ACCESS_TOKEN) is required to resolve a date window",
                )
                .into());
        }
        _ => Box::new(OfflineSource),
    };

    let vcs = GitCli::new();
    let runner = SystemRunner;
    let request = DownloadRequest {
        key,
        no_sync: args.no_sync,
        skip_post_steps: args.skip_post_steps,
    };

    let report = Orchestrator::new(&settings, source.as_ref(), &vcs, &runner)
        .download(&args.workspace, &request)
        .await?;
    print_report(&report);
    Ok(())
}

fn snapshot_key(args: &DownloadArgs) -> Result<Option<SnapshotKey>> {
    if let Some(name) = &args.entry {
        return Ok(Some(SnapshotKey::named(name.as_str())?));
    }
    if args.since.is_none() && args.until.is_none() {
        return Ok(None);
    }
    let window = TimeWindow::new(args.since, args.until)?;
    Ok(Some(SnapshotKey::range(window)))
}

fn print_report(report: &DownloadReport) {
    match &report.key {
        Some(key) => {
            println!("✓ Workspace pinned:");
            println!("  snapshot: {}", key);
            if let Some(commit) = &report.manifest_commit {
                println!("  manifest_commit: {}", commit);
            }
            println!("  resolved_from_cache: {}", report.resolved_from_cache);
            println!("  resolved_from_remote: {}", report.resolved_from_remote);
            println!("  checked_out: {}", report.checked_out);
        }
        None => println!("✓ Workspace synced to the latest manifest"),
    }
    println!("  post_steps_run: {}", report.post_steps_run);
}
