//! Snapshot commands: record, list and inspect cached snapshots

use anyhow::Result;
use clap::{Args, Subcommand};
use mrsnap_core::errors::{ExError, ExErrorKind};
use mrsnap_core::SnapshotKey;
use mrsnap_engine::{Orchestrator, Settings, Workspace};
use mrsnap_remote::OfflineSource;
use mrsnap_store::SnapshotCache;
use mrsnap_vcs::{GitCli, SystemRunner};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Record every project's checked-out commit under a name
    Save(SaveArgs),
    /// List cached snapshot keys
    List(ListArgs),
    /// Print the entries of one cached snapshot
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct SaveArgs {
    pub workspace: PathBuf,

    pub name: String,

    /// Config file (defaults to <WORKSPACE>/mrsnap.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub workspace: PathBuf,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub workspace: PathBuf,

    /// Tagged key, e.g. `name:release-1` or `range:2024-01-01..2024-02-01`
    pub key: String,
}

pub fn execute(args: SnapshotArgs) -> Result<()> {
    match args.command {
        SnapshotCommand::Save(save_args) => execute_save(save_args),
        SnapshotCommand::List(list_args) => execute_list(list_args),
        SnapshotCommand::Show(show_args) => execute_show(show_args),
    }
}

fn execute_save(args: SaveArgs) -> Result<()> {
    let settings = Settings::load(args.config.as_deref(), &args.workspace)?;
    let vcs = GitCli::new();
    let report = Orchestrator::new(&settings, &OfflineSource, &vcs, &SystemRunner)
        .record_snapshot(&args.workspace, &args.name)?;

    println!("✓ Snapshot recorded:");
    println!("  snapshot: {}", report.key);
    println!("  recorded: {}", report.recorded);
    println!("  unchanged: {}", report.unchanged);
    if !report.missing.is_empty() {
        println!("  missing: {}", report.missing.join(", "));
    }
    Ok(())
}

fn execute_list(args: ListArgs) -> Result<()> {
    let cache = read_cache(&args.workspace)?;
    if cache.is_empty() {
        println!("No snapshots cached");
        return Ok(());
    }
    for key in cache.keys() {
        let entries = cache.bucket(key).map_or(0, |b| b.len());
        println!("{}\t{}", key, entries);
    }
    Ok(())
}

fn execute_show(args: ShowArgs) -> Result<()> {
    let key: SnapshotKey = args.key.parse()?;
    let cache = read_cache(&args.workspace)?;
    let bucket = cache.bucket(&key).ok_or_else(|| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("snapshot_show")
            .with_snapshot_key(key.to_string())
            .with_message("no such snapshot in the cache")
    })?;

    for (project, record) in bucket {
        println!("{}\t{}\t{}", project, record.relative_path, record.commit);
    }
    Ok(())
}

fn read_cache(workspace: &std::path::Path) -> Result<SnapshotCache> {
    let workspace = Workspace::open(workspace)?;
    Ok(SnapshotCache::read(&workspace.cache_path())?)
}
